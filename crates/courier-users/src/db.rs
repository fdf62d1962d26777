use rusqlite::{Connection, Result};

use courier_core::{Frequency, NotificationSettings};

use crate::types::User;

/// The lookup query every directory read goes through. The column order
/// must match [`row_to_user`].
pub(crate) const USER_SELECT_SQL: &str = "SELECT id, display_name, email, phone,
        notification_enabled, notification_by_email, notification_by_sms,
        notification_frequency, errors, created_at, updated_at
 FROM users WHERE id = ?1";

/// Map a SELECT row (column order from USER_SELECT_SQL) to a User.
/// Centralised here so every query in this crate stays consistent.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    use std::str::FromStr;
    let errors: Vec<String> =
        serde_json::from_str(&row.get::<_, String>(8)?).unwrap_or_default();

    // A NULL notification_enabled column means the user never stored
    // settings; the directory applies defaults at read time.
    let settings = match row.get::<_, Option<i32>>(4)? {
        None => None,
        Some(enabled) => {
            let frequency = row
                .get::<_, Option<String>>(7)?
                .and_then(|s| Frequency::from_str(&s).ok())
                .unwrap_or(Frequency::Immediate);
            Some(NotificationSettings {
                enabled: enabled != 0,
                by_email: row.get::<_, Option<i32>>(5)?.unwrap_or(1) != 0,
                by_sms: row.get::<_, Option<i32>>(6)?.unwrap_or(0) != 0,
                frequency,
            })
        }
    };

    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        settings,
        errors,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Initialise the users table. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id                      TEXT PRIMARY KEY NOT NULL,
            display_name            TEXT NOT NULL,
            email                   TEXT,
            phone                   TEXT,
            notification_enabled    INTEGER,  -- NULL: no stored settings
            notification_by_email   INTEGER,
            notification_by_sms     INTEGER,
            notification_frequency  TEXT,
            errors                  TEXT NOT NULL DEFAULT '[]',  -- JSON array
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );",
    )
}
