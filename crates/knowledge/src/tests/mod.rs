//! Crate-level tests with scripted collaborators.

mod end_to_end;
mod rag_ranking;

use crate::rerank::Reranker;
use crate::store::{InMemoryStore, Retriever, VectorStore};
use crate::types::{Chunk, EmbeddedChunk, ScoreKind, ScoredChunk, TextUnit};
use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn candidate(text: &str, source: &str) -> ScoredChunk {
    ScoredChunk {
        chunk: Chunk::new(text, TextUnit::new("", source).metadata),
        vector_score: 0.5,
        score_kind: ScoreKind::Distance,
    }
}

/// Returns canned candidates, or reports the store as not ready.
pub(crate) struct FixedRetriever {
    results: Option<Vec<ScoredChunk>>,
    pub calls: AtomicUsize,
}

impl FixedRetriever {
    pub fn with(results: Vec<ScoredChunk>) -> Self {
        Self {
            results: Some(results),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            results: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.results {
            Some(results) => Ok(results.iter().take(k).cloned().collect()),
            None => Err(AppError::StoreNotReady("empty".to_string())),
        }
    }
}

/// Returns fixed scores after an optional delay.
pub(crate) struct ScriptedReranker {
    scores: Vec<f32>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl ScriptedReranker {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(scores: Vec<f32>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(scores)
        }
    }
}

#[async_trait]
impl Reranker for ScriptedReranker {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn rerank(&self, _query: &str, _passages: &[String]) -> AppResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.scores.clone())
    }
}

/// Wraps an in-memory store and records how many writes overlap.
pub(crate) struct OverlapStore {
    inner: InMemoryStore,
    write_delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl OverlapStore {
    pub fn new(inner: InMemoryStore, write_delay: Duration) -> Self {
        Self {
            inner,
            write_delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorStore for OverlapStore {
    fn backend_name(&self) -> &str {
        "overlap"
    }

    fn score_kind(&self) -> ScoreKind {
        self.inner.score_kind()
    }

    async fn add_documents(&self, chunks: &[EmbeddedChunk]) -> AppResult<usize> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.write_delay).await;
        let written = self.inner.add_documents(chunks).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        written
    }

    async fn similarity_search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        self.inner.similarity_search(query, k).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }
}

/// Records prompts and replies with a fixed answer.
pub(crate) struct ScriptedLlm {
    reply: Result<String, String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(reply)
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(0, 0),
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
