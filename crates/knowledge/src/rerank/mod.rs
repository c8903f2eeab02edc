//! Relevance scoring for retrieved passages.

pub mod http;
pub mod lexical;

pub use http::HttpReranker;
pub use lexical::LexicalReranker;

use async_trait::async_trait;
use docqa_core::config::RerankerSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Scores `(query, passage)` pairs.
///
/// Returns one score per passage, in input order. Higher is more relevant.
#[async_trait]
pub trait Reranker: Send + Sync {
    fn model_name(&self) -> &str;

    async fn rerank(&self, query: &str, passages: &[String]) -> AppResult<Vec<f32>>;
}

/// Build the reranker selected in settings.
pub fn create_reranker(settings: &RerankerSettings) -> AppResult<Arc<dyn Reranker>> {
    match settings.provider.to_lowercase().as_str() {
        "http" => Ok(Arc::new(HttpReranker::new(
            &settings.endpoint,
            &settings.model,
        )?)),
        "lexical" => Ok(Arc::new(LexicalReranker::new())),
        other => Err(AppError::Config(format!(
            "Unknown reranker provider: {}. Supported: http, lexical",
            other
        ))),
    }
}
