use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use courier_core::ChannelKind;
use courier_users::UserDirectory;

use crate::{channel::NotificationChannel, error::ChannelError};

/// Email adapter. Resolves the address through the directory, then spends
/// `transport_delay` standing in for the SMTP round-trip.
pub struct EmailChannel {
    directory: UserDirectory,
    transport_delay: Duration,
}

impl EmailChannel {
    pub fn new(directory: UserDirectory, transport_delay: Duration) -> Self {
        Self {
            directory,
            transport_delay,
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, user_id: &str, message: &str) -> Result<(), ChannelError> {
        let address = self
            .directory
            .get_user_email(user_id)
            .map_err(|e| ChannelError::Transport(e.to_string()))?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "no email address on record");
                ChannelError::EmailNotFound
            })?;

        tokio::time::sleep(self.transport_delay).await;
        debug!(user_id = %user_id, %address, bytes = message.len(), "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_users::User;
    use rusqlite::Connection;

    fn directory_with(user: User) -> UserDirectory {
        let dir = UserDirectory::new(Connection::open_in_memory().unwrap()).unwrap();
        dir.add_user(&user).unwrap();
        dir
    }

    #[tokio::test]
    async fn sends_when_an_address_is_on_record() {
        let mut user = User::new("123", "Mail");
        user.email = Some("test@gmail.com".to_string());
        let channel = EmailChannel::new(directory_with(user), Duration::from_millis(1));

        channel.send("123", "Hello, this is a test email.").await.unwrap();
    }

    #[tokio::test]
    async fn fails_without_an_address() {
        let channel = EmailChannel::new(
            directory_with(User::new("9", "NoMail")),
            Duration::from_millis(1),
        );
        let err = channel.send("9", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "email address not found");
    }
}
