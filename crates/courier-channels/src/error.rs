use thiserror::Error;

/// Errors a delivery channel can produce for a single send.
///
/// The `Display` strings are the user-facing reasons appended to the user's
/// error log, so they stay short and stable.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No email address on record for the recipient (or unknown user).
    #[error("email address not found")]
    EmailNotFound,

    /// No phone number on record for the recipient (or unknown user).
    #[error("phone number not found")]
    PhoneNumberNotFound,

    /// The underlying transport failed after the address resolved.
    #[error("transport failed: {0}")]
    Transport(String),
}
