//! Mapping pipeline failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docqa_core::AppError;
use serde_json::json;

/// Error returned by the query endpoint.
///
/// Client errors become `422` with the validation message; anything else is
/// a `500` carrying the error text.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_client_error() {
            self.0.to_string()
        } else {
            tracing::error!("Query failed: {}", self.0);
            format!("Failed to process query: {}", self.0)
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
