//! Google Sheets v4 REST backend.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SheetConfig;
use crate::error::{Result, StoreError};
use crate::service::{Rows, TabularService};

/// Characters escaped when a range or id is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Values are interpreted as if typed into the sheet UI.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Tabular service backed by a Google spreadsheet.
pub struct GoogleSheets {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ValueBody {
    values: Rows,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GoogleSheets {
    /// Builds a client from configuration.
    pub fn new(config: &SheetConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.base_url,
            utf8_percent_encode(&self.spreadsheet_id, PATH_SEGMENT)
        )
    }

    /// `GET` target for reading a range.
    pub fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            utf8_percent_encode(range, PATH_SEGMENT)
        )
    }

    /// `POST` target for appending after a range's data.
    pub fn append_url(&self, range: &str) -> String {
        format!(
            "{}:append?valueInputOption={}",
            self.values_url(range),
            VALUE_INPUT_OPTION
        )
    }

    /// `PUT` target for overwriting a range.
    pub fn update_url(&self, range: &str) -> String {
        format!(
            "{}?valueInputOption={}",
            self.values_url(range),
            VALUE_INPUT_OPTION
        )
    }

    /// `POST` target for structural edits such as deleting rows.
    pub fn batch_update_url(&self) -> String {
        format!("{}:batchUpdate", self.spreadsheet_url())
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Upstream {
            operation,
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

#[async_trait]
impl TabularService for GoogleSheets {
    async fn read_values(&self, range: &str) -> Result<Rows> {
        let response = self
            .send("read", self.client.get(self.values_url(range)))
            .await?;
        let body = response.text().await.map_err(|e| StoreError::Transport {
            operation: "read",
            message: e.to_string(),
        })?;
        parse_value_range(&body)
    }

    async fn append_values(&self, range: &str, rows: Rows) -> Result<()> {
        let request = self
            .client
            .post(self.append_url(range))
            .json(&ValueBody { values: rows });
        self.send("append", request).await?;
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Rows) -> Result<()> {
        let request = self
            .client
            .put(self.update_url(range))
            .json(&ValueBody { values: rows });
        self.send("update", request).await?;
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: u32, start: usize, end: usize) -> Result<()> {
        let request = self
            .client
            .post(self.batch_update_url())
            .json(&delete_dimension_request(sheet_id, start, end));
        self.send("delete", request).await?;
        Ok(())
    }
}

/// Body of a `batchUpdate` call removing rows `start..end`.
pub fn delete_dimension_request(sheet_id: u32, start: usize, end: usize) -> Value {
    serde_json::json!({
        "requests": [
            {
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": end
                    }
                }
            }
        ]
    })
}

/// Decodes a `ValueRange` body. A missing `values` key means no data.
pub fn parse_value_range(body: &str) -> Result<Rows> {
    let range: ValueRange = serde_json::from_str(body)
        .map_err(|e| StoreError::MalformedResponse(format!("Invalid value range: {}", e)))?;
    Ok(range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Extracts the human-readable message from a Google error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleSheets {
        let config = SheetConfig {
            spreadsheet_id: "1AbC-xyz".to_string(),
            access_token: "token".to_string(),
            api_base_url: "https://sheets.example.test/v4/".to_string(),
            ..Default::default()
        };
        GoogleSheets::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let sheets = client();
        assert_eq!(
            sheets.values_url("Sheet1!A2:C"),
            "https://sheets.example.test/v4/spreadsheets/1AbC-xyz/values/Sheet1%21A2%3AC"
        );
        assert_eq!(
            sheets.append_url("Sheet1!A2:C"),
            "https://sheets.example.test/v4/spreadsheets/1AbC-xyz/values/Sheet1%21A2%3AC:append?valueInputOption=USER_ENTERED"
        );
        assert_eq!(
            sheets.update_url("Sheet1!A3:C3"),
            "https://sheets.example.test/v4/spreadsheets/1AbC-xyz/values/Sheet1%21A3%3AC3?valueInputOption=USER_ENTERED"
        );
        assert_eq!(
            sheets.batch_update_url(),
            "https://sheets.example.test/v4/spreadsheets/1AbC-xyz:batchUpdate"
        );
    }

    #[test]
    fn test_delete_dimension_request() {
        let body = delete_dimension_request(0, 1, 2);
        let range = &body["requests"][0]["deleteDimension"]["range"];
        assert_eq!(range["sheetId"], 0);
        assert_eq!(range["dimension"], "ROWS");
        assert_eq!(range["startIndex"], 1);
        assert_eq!(range["endIndex"], 2);
    }

    #[test]
    fn test_parse_value_range() {
        let rows = parse_value_range(
            r#"{"range":"Sheet1!A2:C3","majorDimension":"ROWS","values":[["A","B","a@x.com"],["C",42]]}"#,
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["A".to_string(), "B".to_string(), "a@x.com".to_string()],
                vec!["C".to_string(), "42".to_string()],
            ]
        );

        let rows = parse_value_range(r#"{"range":"Sheet1!A2:C1000","majorDimension":"ROWS"}"#).unwrap();
        assert!(rows.is_empty());

        assert!(matches!(
            parse_value_range("<html>"),
            Err(StoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(error_message(body), "The caller does not have permission");
        assert_eq!(error_message("quota exceeded\n"), "quota exceeded");
        assert_eq!(error_message(""), "empty response body");
    }
}
