//! Cross-encoder reranking over HTTP.
//!
//! Talks to a Text-Embeddings-Inference compatible `/rerank` endpoint, the
//! usual way of serving models such as `BAAI/bge-reranker-base`.

use super::Reranker;
use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const RERANK_ENDPOINT: &str = "/rerank";

#[derive(Debug, Clone)]
pub struct HttpReranker {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
    raw_scores: bool,
}

#[derive(Debug, Deserialize)]
struct RerankScore {
    index: usize,
    score: f32,
}

impl HttpReranker {
    /// No request timeout is set here; the pipeline bounds the whole call.
    pub fn new(base_url: &str, model: &str) -> AppResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Rerank(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

/// Put scores back in passage order. Every index must appear exactly once.
fn align_scores(mut scores: Vec<RerankScore>, expected: usize) -> AppResult<Vec<f32>> {
    if scores.len() != expected {
        return Err(AppError::Rerank(format!(
            "Reranker returned {} scores for {} passages",
            scores.len(),
            expected
        )));
    }

    scores.sort_by_key(|s| s.index);
    for (position, entry) in scores.iter().enumerate() {
        if entry.index != position {
            return Err(AppError::Rerank(format!(
                "Reranker returned unexpected index {} at position {}",
                entry.index, position
            )));
        }
    }

    Ok(scores.into_iter().map(|s| s.score).collect())
}

#[async_trait]
impl Reranker for HttpReranker {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(
        skip(self, query, passages),
        fields(passages = passages.len(), model = %self.model)
    )]
    async fn rerank(&self, query: &str, passages: &[String]) -> AppResult<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}{}", self.base_url, RERANK_ENDPOINT);
        let request = RerankRequest {
            query,
            texts: passages,
            raw_scores: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Rerank(format!("Failed to reach reranker: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Rerank(format!(
                "Reranker API error ({}): {}",
                status, body
            )));
        }

        let scores: Vec<RerankScore> = response
            .json()
            .await
            .map_err(|e| AppError::Rerank(format!("Failed to parse reranker response: {}", e)))?;

        debug!("Reranked {} passages", scores.len());
        align_scores(scores, passages.len())
    }
}
