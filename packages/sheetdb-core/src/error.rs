//! Store error types.

use thiserror::Error;

/// Errors raised by the record store and its backends.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The tabular service rejected the call (auth, quota, invalid sheet or range)
    #[error("Upstream {operation} failed with status {status}: {message}")]
    Upstream {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("Transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The service answered with a body we could not decode
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// A1 range text could not be parsed
    #[error("Invalid range '{0}'")]
    InvalidRange(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true when the failure came from the external service, either
    /// as a rejection or because it could not be reached.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StoreError::Upstream { .. }
                | StoreError::Transport { .. }
                | StoreError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
