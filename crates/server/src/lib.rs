//! HTTP surface for DocQA.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use docqa_core::config::ServerSettings;
use docqa_core::{AppError, AppResult};
use docqa_knowledge::Services;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct DocQaServer {
    addr: String,
    state: AppState,
}

impl DocQaServer {
    pub fn new(services: Services, settings: &ServerSettings) -> Self {
        Self {
            addr: format!("{}:{}", settings.host, settings.port),
            state: AppState::new(services),
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> AppResult<()> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}: {}", self.addr, e)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Serving on http://{}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| AppError::Other(format!("Server error: {}", e)))
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
