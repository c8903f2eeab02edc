//! Core types for the document store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free-form provenance attached to text units and chunks.
///
/// Always carries `source`; PDF pages also carry a 1-indexed `page_number`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

pub const SOURCE_KEY: &str = "source";
pub const PAGE_NUMBER_KEY: &str = "page_number";

/// Normalized text produced by the document loader, before chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub text: String,
    pub metadata: Metadata,
}

impl TextUnit {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(
            SOURCE_KEY.to_string(),
            serde_json::Value::String(source.into()),
        );
        Self {
            text: text.into(),
            metadata,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.metadata
            .insert(PAGE_NUMBER_KEY.to_string(), page_number.into());
        self
    }

    pub fn page_number(&self) -> Option<u64> {
        self.metadata.get(PAGE_NUMBER_KEY).and_then(|v| v.as_u64())
    }
}

/// A unit of retrievable text.
///
/// Immutable once created. Every chunk gets a fresh id, so ingesting the same
/// file twice yields two distinct sets of chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            metadata,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(|v| v.as_str())
    }

    pub fn page_number(&self) -> Option<u64> {
        self.metadata.get(PAGE_NUMBER_KEY).and_then(|v| v.as_u64())
    }
}

/// A chunk paired with its embedding, ready to be written to a store.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Direction of a vector-stage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    /// Lower is better (L2 distance, cosine distance)
    Distance,
    /// Higher is better (cosine similarity, inner product)
    Similarity,
}

impl ScoreKind {
    /// True if `a` ranks ahead of `b` under this kind.
    pub fn is_better(self, a: f32, b: f32) -> bool {
        match self {
            ScoreKind::Distance => a < b,
            ScoreKind::Similarity => a > b,
        }
    }
}

/// Vector-stage result.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub vector_score: f32,
    pub score_kind: ScoreKind,
}

/// Rerank-stage result. `relevance_score` is always higher-is-better.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankedChunk {
    pub chunk: Chunk,
    pub vector_score: f32,
    pub score_kind: ScoreKind,
    pub relevance_score: f32,
}

impl RerankedChunk {
    pub fn from_scored(scored: ScoredChunk, relevance_score: f32) -> Self {
        Self {
            chunk: scored.chunk,
            vector_score: scored.vector_score,
            score_kind: scored.score_kind,
            relevance_score,
        }
    }
}

/// A file that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Files fully loaded, chunked, embedded and stored
    pub processed: usize,

    /// Chunks written across all processed files
    pub chunks_added: usize,

    pub failed: Vec<FailedFile>,

    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ids_are_never_reused() {
        let unit = TextUnit::new("same text", "a.txt");
        let first = Chunk::new(unit.text.clone(), unit.metadata.clone());
        let second = Chunk::new(unit.text.clone(), unit.metadata.clone());

        assert_ne!(first.id, second.id);
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_text_unit_page_metadata() {
        let unit = TextUnit::new("page text", "doc.pdf").with_page(3);
        assert_eq!(unit.page_number(), Some(3));
        assert_eq!(unit.metadata[SOURCE_KEY], "doc.pdf");

        let chunk = Chunk::new("x", unit.metadata);
        assert_eq!(chunk.source(), Some("doc.pdf"));
        assert_eq!(chunk.page_number(), Some(3));
    }

    #[test]
    fn test_score_kind_direction() {
        assert!(ScoreKind::Distance.is_better(0.1, 0.9));
        assert!(ScoreKind::Similarity.is_better(0.9, 0.1));
    }
}
