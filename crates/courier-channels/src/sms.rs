use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use courier_core::ChannelKind;
use courier_users::UserDirectory;

use crate::{channel::NotificationChannel, error::ChannelError};

/// SMS adapter. Same shape as [`crate::EmailChannel`], keyed on the phone
/// number instead of the email address.
pub struct SmsChannel {
    directory: UserDirectory,
    transport_delay: Duration,
}

impl SmsChannel {
    pub fn new(directory: UserDirectory, transport_delay: Duration) -> Self {
        Self {
            directory,
            transport_delay,
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, user_id: &str, message: &str) -> Result<(), ChannelError> {
        let number = self
            .directory
            .get_user_phone_number(user_id)
            .map_err(|e| ChannelError::Transport(e.to_string()))?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "no phone number on record");
                ChannelError::PhoneNumberNotFound
            })?;

        tokio::time::sleep(self.transport_delay).await;
        debug!(user_id = %user_id, %number, bytes = message.len(), "sms sent");
        Ok(())
    }
}
