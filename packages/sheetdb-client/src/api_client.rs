//! Typed HTTP client for the record endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use sheetdb_core::{Record, RowIndex};

/// Body of `POST /sheets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Body of `PUT /sheets/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    pub row: [String; 3],
    pub index: RowIndex,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    index: RowIndex,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// The four record operations as seen from the client.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Record>>;

    /// Returns the server's confirmation message.
    async fn create(&self, request: &CreateRequest) -> Result<String>;

    async fn update(&self, request: &UpdateRequest) -> Result<String>;

    async fn delete(&self, index: RowIndex) -> Result<String>;
}

/// reqwest-backed client for a running server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns a non-2xx response into `ClientError::Status` carrying its JSON body.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_message(response: reqwest::Response) -> Result<String> {
    let response = check(response).await?;
    let body: MessageResponse = response.json().await?;
    Ok(body.message)
}

#[async_trait]
impl RecordsApi for ApiClient {
    async fn list(&self) -> Result<Vec<Record>> {
        let response = self.client.get(self.url("/sheets")).send().await?;
        let body: ListResponse = check(response).await?.json().await?;
        Ok(body.data)
    }

    async fn create(&self, request: &CreateRequest) -> Result<String> {
        let response = self
            .client
            .post(self.url("/sheets"))
            .json(request)
            .send()
            .await?;
        read_message(response).await
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        let response = self
            .client
            .put(self.url("/sheets/update"))
            .json(request)
            .send()
            .await?;
        read_message(response).await
    }

    async fn delete(&self, index: RowIndex) -> Result<String> {
        let response = self
            .client
            .delete(self.url("/sheets/delete"))
            .json(&DeleteRequest { index })
            .send()
            .await?;
        read_message(response).await
    }
}
