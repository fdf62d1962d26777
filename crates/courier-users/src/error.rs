use thiserror::Error;

/// All directory-layer errors. Kept separate from the other crates' errors
/// so callers can decide which failures are exceptional in their context.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UserError>;
