/// Domain error taxonomy shared by every crate in the workspace.
///
/// Transport crates define their own error enums and convert into this type
/// at their boundary; the API layer maps each variant to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Bad or missing caller input. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential exchange with an upstream service failed.
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// An upstream call failed or returned a non-success status.
    ///
    /// `status` is `None` when no HTTP status was received (network error,
    /// timeout).
    #[error("Upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// An upstream call succeeded but violated its expected contract.
    #[error("Integrity error: {0}")]
    Integrity(String),
}

impl CoreError {
    /// Message suitable for returning to an end user.
    ///
    /// Unlike the `Display` impl this carries no variant prefix.
    pub fn user_message(&self) -> &str {
        match self {
            CoreError::Validation(msg)
            | CoreError::Config(msg)
            | CoreError::Auth(msg)
            | CoreError::Integrity(msg) => msg,
            CoreError::Upstream { message, .. } => message,
        }
    }
}
