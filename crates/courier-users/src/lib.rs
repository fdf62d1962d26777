//! `courier-users` — the user directory.
//!
//! Users live in a SQLite `users` table: identity, contact addresses,
//! notification settings, and an append-only log of delivery errors
//! (stored as a JSON array column). The [`UserDirectory`] handle wraps a
//! shared connection so the manager, the channels, and the gateway can all
//! read and mutate records without owning the database.

pub mod db;
pub mod directory;
pub mod error;
pub mod types;

pub use directory::UserDirectory;
pub use error::{Result, UserError};
pub use types::User;
