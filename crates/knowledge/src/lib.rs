//! Document question answering: ingestion, retrieval, reranking, generation.
//!
//! Documents flow loader → chunker → embedder → vector store. Queries flow
//! retriever → reranker → prompt → LLM, and come back as a [`QueryResult`]
//! with the sources the answer was generated from.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod rag;
pub mod rerank;
pub mod services;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use chunker::Chunker;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::IngestionService;
pub use loader::{load_document, DocumentFormat};
pub use rag::{PipelineOptions, QueryResult, RagPipeline, SourceAttribution};
pub use rerank::{create_reranker, Reranker};
pub use services::Services;
pub use store::{create_store, Retriever, VectorRetriever, VectorStore};
pub use types::{
    Chunk, EmbeddedChunk, FailedFile, IngestReport, Metadata, RerankedChunk, ScoreKind,
    ScoredChunk, TextUnit,
};
