//! In-process vector store.

use super::VectorStore;
use crate::types::{EmbeddedChunk, ScoreKind, ScoredChunk};
use async_trait::async_trait;
use docqa_core::{AppError, AppResult, SimilarityMetric};
use std::cmp::Ordering;
use tokio::sync::RwLock;

/// Brute-force store held in memory. Nothing survives a restart.
///
/// L2 reports distances; cosine and inner product report similarities.
pub struct InMemoryStore {
    metric: SimilarityMetric,
    chunks: RwLock<Vec<EmbeddedChunk>>,
}

impl InMemoryStore {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            metric,
            chunks: RwLock::new(Vec::new()),
        }
    }

    fn score(&self, query: &[f32], embedding: &[f32]) -> f32 {
        match self.metric {
            SimilarityMetric::L2 => query
                .iter()
                .zip(embedding)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f32>()
                .sqrt(),
            SimilarityMetric::InnerProduct => dot(query, embedding),
            SimilarityMetric::Cosine => {
                let norms = dot(query, query).sqrt() * dot(embedding, embedding).sqrt();
                if norms == 0.0 {
                    0.0
                } else {
                    dot(query, embedding) / norms
                }
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn score_kind(&self) -> ScoreKind {
        match self.metric {
            SimilarityMetric::L2 => ScoreKind::Distance,
            SimilarityMetric::Cosine | SimilarityMetric::InnerProduct => ScoreKind::Similarity,
        }
    }

    async fn add_documents(&self, chunks: &[EmbeddedChunk]) -> AppResult<usize> {
        let mut stored = self.chunks.write().await;
        if let (Some(first), Some(new)) = (stored.first(), chunks.first()) {
            if first.embedding.len() != new.embedding.len() {
                return Err(AppError::Store(format!(
                    "Embedding dimension mismatch: store has {}, got {}",
                    first.embedding.len(),
                    new.embedding.len()
                )));
            }
        }
        stored.extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn similarity_search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        let stored = self.chunks.read().await;
        if stored.is_empty() {
            return Err(AppError::StoreNotReady(
                "no documents have been ingested".to_string(),
            ));
        }

        let kind = self.score_kind();
        let mut scored: Vec<ScoredChunk> = stored
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                vector_score: self.score(query, &entry.embedding),
                score_kind: kind,
            })
            .collect();

        scored.sort_by(|a, b| {
            if kind.is_better(a.vector_score, b.vector_score) {
                Ordering::Less
            } else if kind.is_better(b.vector_score, a.vector_score) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.chunks.read().await.len())
    }
}
