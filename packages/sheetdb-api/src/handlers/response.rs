//! Response types and helpers for HTTP endpoints.

use serde::Serialize;

/// Successful read: `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Successful mutation: `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Failure: `{"error": "...", "details": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Short reason, e.g. "Missing fields"
    pub error: String,
    /// Optional underlying cause
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Helper to create data response
pub fn data_response<T: Serialize>(data: T) -> DataResponse<T> {
    DataResponse { data }
}

/// Helper to create message response
pub fn message_response(message: &str) -> MessageResponse {
    MessageResponse {
        message: message.to_string(),
    }
}

/// Helper to create error response
pub fn error_response(error: String, details: Option<String>) -> ErrorResponse {
    ErrorResponse { error, details }
}
