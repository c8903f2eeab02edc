//! Command handlers for the DocQA CLI.

pub mod ingest;
pub mod query;
pub mod remote;
pub mod serve;

pub use ingest::IngestCommand;
pub use query::QueryCommand;
pub use serve::ServeCommand;
