//! HTTP routes.

pub mod health;
pub mod ingest;
pub mod query;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/ingest", post(ingest::trigger_ingest))
        .route("/query", post(query::query))
}
