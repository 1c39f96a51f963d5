//! Request utilities for HTTP endpoints.

use hyper::{body::Bytes, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::router::RouterError;
use sheetdb_core::range::MAX_ROW_INDEX;
use sheetdb_core::{Record, RowIndex, StoreError};

/// Map StoreError to appropriate RouterError
pub fn map_store_error_to_router_error(e: StoreError) -> RouterError {
    if e.is_upstream() {
        RouterError::Upstream(e.to_string())
    } else {
        RouterError::InternalError(format!("Store error: {}", e))
    }
}

/// Parses a JSON body into `T`.
///
/// Text that is not JSON is a `MalformedBody` error. JSON of the wrong shape
/// (an array where an object was expected, say) is reported with
/// `missing`, the same message as absent fields.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes, missing: &str) -> Result<T, RouterError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RouterError::MalformedBody(e.to_string()))?;
    serde_json::from_value(value).map_err(|_| RouterError::Validation(missing.to_string()))
}

/// Returns the text of a field when it is a non-empty string.
pub fn present_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Returns the row index when the value is a non-negative whole number that
/// addresses a row inside the sheet.
pub fn row_index(value: Option<&Value>) -> Option<RowIndex> {
    let number = match value {
        Some(Value::Number(n)) => n,
        _ => return None,
    };
    let index = match (number.as_u64(), number.as_f64()) {
        (Some(index), _) => usize::try_from(index).ok()?,
        (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 && f <= MAX_ROW_INDEX as f64 => {
            f as usize
        }
        _ => return None,
    };
    (index <= MAX_ROW_INDEX).then_some(index)
}

/// Request to create a record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub first_name: Option<Value>,
    #[serde(default)]
    pub last_name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

impl CreateRecordRequest {
    /// Returns the record when all three fields are non-empty strings.
    pub fn record(&self) -> Option<Record> {
        Some(Record::new(
            present_text(self.first_name.as_ref())?,
            present_text(self.last_name.as_ref())?,
            present_text(self.email.as_ref())?,
        ))
    }
}

/// Request to overwrite a record by position.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordRequest {
    /// New cell values; only the first three are used
    #[serde(default)]
    pub row: Option<Value>,
    #[serde(default)]
    pub index: Option<Value>,
}

impl UpdateRecordRequest {
    /// Returns the record and index when `row` holds three non-empty
    /// strings and `index` is a valid position.
    pub fn record_and_index(&self) -> Option<(Record, RowIndex)> {
        let cells = match &self.row {
            Some(Value::Array(cells)) => cells,
            _ => return None,
        };
        let record = Record::new(
            present_text(cells.first())?,
            present_text(cells.get(1))?,
            present_text(cells.get(2))?,
        );
        let index = row_index(self.index.as_ref())?;
        Some((record, index))
    }
}

/// Request to delete a record by position.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRecordRequest {
    #[serde(default)]
    pub index: Option<Value>,
}

impl DeleteRecordRequest {
    pub fn index(&self) -> Option<RowIndex> {
        row_index(self.index.as_ref())
    }
}

/// Helper to build JSON HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build a response for an embedded static asset
pub fn build_asset_response(
    content_type: &str,
    body: &'static str,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Cache-Control", "no-cache")
        .body(Bytes::from_static(body.as_bytes()))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
