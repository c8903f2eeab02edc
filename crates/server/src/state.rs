//! Shared application state.

use docqa_knowledge::{IngestionService, RagPipeline, Services, VectorStore};
use std::path::Path;
use std::sync::Arc;

/// Cheap to clone; every handler gets its own copy.
#[derive(Clone)]
pub struct AppState {
    services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.services.pipeline
    }

    pub fn ingestion(&self) -> &Arc<IngestionService> {
        &self.services.ingestion
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.services.store
    }

    pub fn files_directory(&self) -> &Path {
        &self.services.files_directory
    }
}
