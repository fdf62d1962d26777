use chrono::Utc;
use courier_core::NotificationSettings;
use serde::{Deserialize, Serialize};

/// Full user record as stored in SQLite.
///
/// `settings` stays `None` when the user never chose preferences; the
/// directory substitutes [`NotificationSettings::default`] at read time so
/// both cases behave identically downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Caller-assigned unique id.
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub settings: Option<NotificationSettings>,
    /// Append-only delivery error log. Never trimmed or rewritten.
    pub errors: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// A bare record with no contact info and no stored settings.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: None,
            phone: None,
            settings: None,
            errors: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
