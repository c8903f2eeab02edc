//! Error types for DocQA.
//!
//! A single error enum covers configuration, input validation, every stage of
//! the query pipeline, and ingestion. Library code returns `AppResult<T>` and
//! lets the surface (CLI or HTTP) decide how a failure is presented.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for DocQA.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Empty or otherwise invalid user input, rejected before any external call
    #[error("Invalid input: {0}")]
    Input(String),

    /// The vector store has no collection or no ingested chunks yet
    #[error("Vector store not ready: {0}")]
    StoreNotReady(String),

    /// Similarity search (or the query embedding it needs) failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Reranker call failed, timed out, or returned the wrong number of scores
    #[error("Rerank failed: {0}")]
    Rerank(String),

    /// Generation call failed, timed out, or produced no text
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM transport errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// A single file failed during ingestion
    #[error("Failed to ingest {path:?}: {reason}")]
    IngestionItem { path: PathBuf, reason: String },

    /// No loader exists for this file extension
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Vector store backend errors outside of search
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller abandoned the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap any error as a per-file ingestion failure.
    pub fn ingestion_item(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::IngestionItem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
