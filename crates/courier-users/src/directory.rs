use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, error, info};

use courier_core::{DeliveryFailure, NotificationSettings};

use crate::db::{init_db, row_to_user, USER_SELECT_SQL};
use crate::error::{Result, UserError};
use crate::types::User;

/// Shared handle over the users table.
///
/// Wraps its connection in `Arc<Mutex<..>>` so channel adapters and the
/// manager can hold clones and query concurrently from async tasks.
#[derive(Clone)]
pub struct UserDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl UserDirectory {
    /// Create a directory handle, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new user row. Fails with `AlreadyExists` on a duplicate id.
    pub fn add_user(&self, user: &User) -> Result<()> {
        if self.get_user(&user.id)?.is_some() {
            return Err(UserError::AlreadyExists(user.id.clone()));
        }
        let errors_json = serde_json::to_string(&user.errors)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users
             (id, display_name, email, phone,
              notification_enabled, notification_by_email, notification_by_sms,
              notification_frequency, errors, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                user.id,
                user.display_name,
                user.email,
                user.phone,
                user.settings.as_ref().map(|s| s.enabled as i32),
                user.settings.as_ref().map(|s| s.by_email as i32),
                user.settings.as_ref().map(|s| s.by_sms as i32),
                user.settings.as_ref().map(|s| s.frequency.to_string()),
                errors_json,
                user.created_at,
                user.updated_at,
            ],
        )?;
        info!(user_id = %user.id, "user added");
        Ok(())
    }

    /// Load a user by id. Returns None instead of an error when absent so
    /// callers decide whether missing is exceptional in their context.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(USER_SELECT_SQL)?;
        match stmt.query_row(params![user_id], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(UserError::DatabaseError(e)),
        }
    }

    /// Notification settings for a user.
    ///
    /// A known user without stored settings gets the defaults (settings are
    /// total once defaulted); an unknown user yields `None`.
    pub fn get_user_settings(&self, user_id: &str) -> Result<Option<NotificationSettings>> {
        Ok(self
            .get_user(user_id)?
            .map(|user| user.settings.unwrap_or_default()))
    }

    /// Email address on record, or `None` (absent address or unknown user).
    pub fn get_user_email(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.get_user(user_id)?.and_then(|user| user.email))
    }

    /// Phone number on record, or `None` (absent number or unknown user).
    pub fn get_user_phone_number(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.get_user(user_id)?.and_then(|user| user.phone))
    }

    /// Append a delivery failure to the user's error log.
    ///
    /// Infallible by contract: an unknown user id is a no-op, and a storage
    /// failure is logged rather than surfaced — a broken error log must not
    /// take down the delivery path that reported it.
    pub fn cannot_send_notification(&self, failure: &DeliveryFailure) {
        match self.append_error(&failure.user_id, &failure.error) {
            Ok(true) => {
                info!(user_id = %failure.user_id, error = %failure.error, "delivery failure recorded");
            }
            Ok(false) => {
                debug!(user_id = %failure.user_id, "delivery failure for unknown user, ignored");
            }
            Err(e) => {
                error!(user_id = %failure.user_id, error = %e, "failed to record delivery failure");
            }
        }
    }

    /// Read side of the append-only error log. Empty for unknown users.
    pub fn errors(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .get_user(user_id)?
            .map(|user| user.errors)
            .unwrap_or_default())
    }

    /// Returns Ok(false) when the user does not exist.
    fn append_error(&self, user_id: &str, message: &str) -> Result<bool> {
        let Some(user) = self.get_user(user_id)? else {
            return Ok(false);
        };
        let mut errors = user.errors;
        errors.push(message.to_string());
        let errors_json = serde_json::to_string(&errors)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET errors = ?2, updated_at = ?3 WHERE id = ?1",
            params![user_id, errors_json, now],
        )?;
        Ok(true)
    }
}
