//! `courier-channels` — delivery channel adapters.
//!
//! Each adapter resolves its contact address through the user directory and
//! simulates the transport itself (a delay, then success). The seam is the
//! [`NotificationChannel`] trait so the manager and tests can swap in other
//! transports.

pub mod channel;
pub mod email;
pub mod error;
pub mod sms;

pub use channel::NotificationChannel;
pub use email::EmailChannel;
pub use error::ChannelError;
pub use sms::SmsChannel;
