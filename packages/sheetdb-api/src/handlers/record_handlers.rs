//! List, create, update and delete handlers.
//!
//! Records are addressed by their position in the list. Each handler makes
//! one store call; store failures surface as 502 envelopes.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_response, map_store_error_to_router_error, parse_body, CreateRecordRequest,
    DeleteRecordRequest, UpdateRecordRequest,
};
use super::response::{data_response, message_response};

const MISSING_FIELDS: &str = "Missing fields";
const MISSING_DATA_OR_INDEX: &str = "Missing data or index";
const MISSING_INDEX: &str = "Missing index";

/// Lists every record.
///
/// # Endpoint
/// `GET /sheets`
///
/// # Response
/// - **200 OK**
/// ```json
/// { "data": [["Ada", "Lovelace", "ada@engine.org"]] }
/// ```
///
/// # Errors
/// - **502 Bad Gateway**: the spreadsheet service failed
pub async fn list_records(
    _req: Request<Bytes>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let records = state
        .store
        .list()
        .await
        .map_err(map_store_error_to_router_error)?;

    let json = serde_json::to_vec(&data_response(records))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(200, json)
}

/// Appends a record after the last row.
///
/// # Endpoint
/// `POST /sheets`
///
/// # Request Body
/// ```json
/// { "firstName": "Ada", "lastName": "Lovelace", "email": "ada@engine.org" }
/// ```
///
/// # Errors
/// - **400 Bad Request**: `{"error": "Missing fields"}` when any field is
///   absent or empty
/// - **502 Bad Gateway**: the spreadsheet service failed
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/sheets \
///   -H "Content-Type: application/json" \
///   -d '{"firstName": "Ada", "lastName": "Lovelace", "email": "ada@engine.org"}'
/// ```
pub async fn create_record(
    req: Request<Bytes>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let request: CreateRecordRequest = parse_body(req.body(), MISSING_FIELDS)?;
    let record = request
        .record()
        .ok_or_else(|| RouterError::Validation(MISSING_FIELDS.to_string()))?;

    state
        .store
        .append(&record)
        .await
        .map_err(map_store_error_to_router_error)?;

    let json = serde_json::to_vec(&message_response("Row added successfully"))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(200, json)
}

/// Overwrites the record at a position.
///
/// # Endpoint
/// `PUT /sheets/update`
///
/// # Request Body
/// ```json
/// { "row": ["Ada", "King", "ada@engine.org"], "index": 0 }
/// ```
///
/// # Errors
/// - **400 Bad Request**: `{"error": "Missing data or index"}`
/// - **502 Bad Gateway**: the spreadsheet service failed
///
/// # Notes
/// - The index is not checked against the current list length
pub async fn update_record(
    req: Request<Bytes>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let request: UpdateRecordRequest = parse_body(req.body(), MISSING_DATA_OR_INDEX)?;
    let (record, index) = request
        .record_and_index()
        .ok_or_else(|| RouterError::Validation(MISSING_DATA_OR_INDEX.to_string()))?;

    state
        .store
        .replace(&record, index)
        .await
        .map_err(map_store_error_to_router_error)?;

    let json = serde_json::to_vec(&message_response("Row updated successfully"))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(200, json)
}

/// Deletes the record at a position; later records move up by one.
///
/// # Endpoint
/// `DELETE /sheets/delete`
///
/// # Request Body
/// ```json
/// { "index": 0 }
/// ```
///
/// # Errors
/// - **400 Bad Request**: `{"error": "Missing index"}`
/// - **502 Bad Gateway**: the spreadsheet service failed, including an
///   index past the end of the sheet
pub async fn delete_record(
    req: Request<Bytes>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let request: DeleteRecordRequest = parse_body(req.body(), MISSING_INDEX)?;
    let index = request
        .index()
        .ok_or_else(|| RouterError::Validation(MISSING_INDEX.to_string()))?;

    state
        .store
        .remove(index)
        .await
        .map_err(map_store_error_to_router_error)?;

    let json = serde_json::to_vec(&message_response("Row deleted successfully"))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(200, json)
}
