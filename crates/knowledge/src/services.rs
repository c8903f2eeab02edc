//! Composition root.

use crate::chunker::Chunker;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::ingest::IngestionService;
use crate::rag::{PipelineOptions, RagPipeline};
use crate::rerank::{create_reranker, Reranker};
use crate::store::{create_store, VectorRetriever, VectorStore};
use docqa_core::{AppResult, Settings};
use docqa_llm::{create_client, LlmClient};
use docqa_prompt::{load_template, PromptTemplate};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a surface (CLI or HTTP) needs, built once per process.
#[derive(Clone)]
pub struct Services {
    pub pipeline: Arc<RagPipeline>,
    pub ingestion: Arc<IngestionService>,
    pub store: Arc<dyn VectorStore>,
    pub files_directory: PathBuf,
}

impl Services {
    /// Validate settings and construct every collaborator from them.
    pub async fn build(settings: &Settings) -> AppResult<Self> {
        settings.validate()?;

        let embedder = create_provider(&settings.embedding)?;
        let store = create_store(&settings.store, embedder.dimensions()).await?;
        let reranker = create_reranker(&settings.reranker)?;
        let llm = create_client(&settings.generation)?;
        let template = load_template(settings.prompt_file.as_deref())?;

        tracing::info!(
            store = store.backend_name(),
            embedder = embedder.model_name(),
            reranker = reranker.model_name(),
            llm = llm.provider_name(),
            "Services ready"
        );

        Self::from_parts(settings, embedder, store, reranker, llm, template)
    }

    /// Wire pre-built collaborators together.
    pub fn from_parts(
        settings: &Settings,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        reranker: Arc<dyn Reranker>,
        llm: Arc<dyn LlmClient>,
        template: PromptTemplate,
    ) -> AppResult<Self> {
        let retriever = Arc::new(VectorRetriever::new(embedder.clone(), store.clone()));
        let pipeline = RagPipeline::new(
            retriever,
            reranker,
            llm,
            template,
            PipelineOptions::from_settings(settings),
        )?;

        let ingestion = IngestionService::new(
            Chunker::from_settings(&settings.chunking)?,
            embedder,
            store.clone(),
            settings.chunking.embed_batch_size,
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            ingestion: Arc::new(ingestion),
            store,
            files_directory: settings.files_directory.clone(),
        })
    }
}
