//! Question answering over ingested documents.

pub mod pipeline;
pub mod types;

pub use pipeline::{build_context, rank_and_truncate, PipelineOptions, RagPipeline};
pub use types::{QueryResult, SourceAttribution, NO_ANSWER};
