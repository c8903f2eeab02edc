//! Client for a running `docqa serve` instance.

use docqa_core::{AppError, AppResult};
use docqa_knowledge::QueryResult;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST /ingest. Returns the server's acknowledgement.
    pub async fn ingest(&self) -> AppResult<Value> {
        let response = self
            .client
            .post(format!("{}/ingest", self.base_url))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        check(response).await?.json().await.map_err(decode_error)
    }

    /// POST /query
    pub async fn query(&self, query: &str) -> AppResult<QueryResult> {
        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        check(response).await?.json().await.map_err(decode_error)
    }

    fn unreachable(&self, e: reqwest::Error) -> AppError {
        AppError::Other(format!("Failed to reach {}: {}", self.base_url, e))
    }
}

/// Turn a non-2xx response into an error carrying the server's `detail`.
async fn check(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["detail"].as_str().map(str::to_string))
        .unwrap_or(body);

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        Err(AppError::Input(detail))
    } else {
        Err(AppError::Other(format!("Server returned {}: {}", status, detail)))
    }
}

fn decode_error(e: reqwest::Error) -> AppError {
    AppError::Serialization(format!("Failed to decode server response: {}", e))
}
