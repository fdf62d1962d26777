use async_trait::async_trait;

use courier_core::ChannelKind;

use crate::error::ChannelError;

/// Common interface implemented by every delivery channel adapter.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` and driven from multiple Tokio tasks. `send` takes `&self` so a
/// single adapter can deliver concurrently without a mutable borrow.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Which delivery channel this adapter implements.
    fn kind(&self) -> ChannelKind;

    /// Deliver one message to the user behind `user_id`.
    ///
    /// The adapter resolves the contact address itself and fails when none
    /// is on record. Resolves only once the transport has settled.
    async fn send(&self, user_id: &str, message: &str) -> Result<(), ChannelError>;
}
