//! Query response types.

use crate::types::{Metadata, RerankedChunk};
use serde::{Deserialize, Serialize};

/// Answer returned when nothing relevant was retrieved.
pub const NO_ANSWER: &str = "I don't know.";

/// Provenance for one chunk used to answer a query.
///
/// Serializes as a single flat object: the chunk's metadata keys (`source`,
/// `page_number`, ...) sit beside the text and scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    #[serde(flatten)]
    pub metadata: Metadata,

    pub chunk_text: String,

    /// Raw vector-stage score. Direction depends on the store's metric.
    pub vector_similarity_score: f32,

    /// Reranker score, higher is more relevant
    pub relevance_score: f32,
}

impl From<RerankedChunk> for SourceAttribution {
    fn from(reranked: RerankedChunk) -> Self {
        Self {
            metadata: reranked.chunk.metadata,
            chunk_text: reranked.chunk.text,
            vector_similarity_score: reranked.vector_score,
            relevance_score: reranked.relevance_score,
        }
    }
}

impl SourceAttribution {
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .get(crate::types::SOURCE_KEY)
            .and_then(|v| v.as_str())
    }

    pub fn page_number(&self) -> Option<u64> {
        self.metadata
            .get(crate::types::PAGE_NUMBER_KEY)
            .and_then(|v| v.as_u64())
    }
}

/// Answer plus the sources it was generated from, most relevant first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceAttribution>,
}

impl QueryResult {
    pub fn no_answer() -> Self {
        Self {
            answer: NO_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }
}
