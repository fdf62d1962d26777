//! `courier-manager` — the notification orchestrator.
//!
//! On every `notify` the manager reads the user's settings, decides
//! immediate-vs-batched dispatch per channel, and either sends now or
//! enqueues into the cadence's batch scheduler. Delivery failures from any
//! path end up in the user directory's error log and nowhere else.

pub mod manager;

pub use manager::{ChannelRoute, NotificationManager};
