//! `courier-core` — shared vocabulary for the courier workspace.
//!
//! Holds the types every other crate speaks: notification settings and
//! frequencies, the channel kinds, the [`DeliveryFailure`] event produced
//! whenever a send fails, and the figment-based configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::CourierConfig;
pub use error::{CourierError, Result};
pub use types::{ChannelKind, DeliveryFailure, Frequency, NotificationSettings};
