//! Liveness and readiness.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store_ready: bool,
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ready = match state.store().is_ready().await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::warn!("Store readiness check failed: {}", e);
            false
        }
    };

    Json(HealthResponse {
        status: "ok",
        store_ready,
    })
}
