use thiserror::Error;

use crate::views::FormError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Server returned {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            ClientError::NetworkError(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
