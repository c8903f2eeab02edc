//! Question answering endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use docqa_knowledge::QueryResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// POST /query
///
/// A client that disconnects drops this future, which abandons the
/// in-flight reranker and LLM calls.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    tracing::info!("Query: {:?}", request.query);
    let result = state.pipeline().answer(&request.query).await?;
    Ok(Json(result))
}
