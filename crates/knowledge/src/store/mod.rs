//! Vector store abstraction and query-side retrieval.

pub mod lance;
pub mod memory;

pub use lance::LanceDbStore;
pub use memory::InMemoryStore;

use crate::embeddings::EmbeddingProvider;
use crate::types::{EmbeddedChunk, ScoreKind, ScoredChunk};
use async_trait::async_trait;
use docqa_core::config::StoreSettings;
use docqa_core::{AppError, AppResult, StoreBackend};
use std::sync::Arc;

/// Persists embedded chunks and answers nearest-neighbour queries.
///
/// Implementations must be safe for concurrent readers. Writers are
/// serialized by the ingestion service.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// Direction of the scores returned by `similarity_search`.
    fn score_kind(&self) -> ScoreKind;

    /// Append chunks. Returns the number written.
    async fn add_documents(&self, chunks: &[EmbeddedChunk]) -> AppResult<usize>;

    /// Return up to `k` chunks nearest to `query`, best first.
    ///
    /// Fails with `AppError::StoreNotReady` when nothing has been ingested.
    async fn similarity_search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Number of stored chunks; zero when the collection does not exist.
    async fn count(&self) -> AppResult<usize>;

    async fn is_ready(&self) -> AppResult<bool> {
        Ok(self.count().await? > 0)
    }
}

/// Query-side retrieval: text in, scored chunks out.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>>;
}

/// Embeds the query with the ingestion embedder, then searches the store.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to embed query: {}", e)))?;

        self.store.similarity_search(&vector, k).await
    }
}

/// Open the store selected in settings.
pub async fn create_store(
    settings: &StoreSettings,
    dimensions: usize,
) -> AppResult<Arc<dyn VectorStore>> {
    match settings.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new(settings.similarity_metric))),
        StoreBackend::Lancedb => Ok(Arc::new(
            LanceDbStore::open(
                &settings.persisted_db,
                &settings.collection,
                dimensions,
                settings.similarity_metric,
            )
            .await?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockProvider;
    use crate::types::Chunk;
    use docqa_core::SimilarityMetric;

    async fn seeded_store(embedder: &MockProvider, texts: &[&str]) -> Arc<dyn VectorStore> {
        let store = InMemoryStore::new(SimilarityMetric::Cosine);
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let vectors = embedder.embed_batch(&owned).await.unwrap();
        let chunks: Vec<EmbeddedChunk> = owned
            .into_iter()
            .zip(vectors)
            .map(|(text, embedding)| EmbeddedChunk {
                chunk: Chunk::new(text, Default::default()),
                embedding,
            })
            .collect();
        store.add_documents(&chunks).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_retriever_ranks_related_text_first() {
        let embedder = MockProvider::new(256);
        let store = seeded_store(
            &embedder,
            &[
                "Pasta should be cooked al dente.",
                "Paris is the capital of France.",
            ],
        )
        .await;

        let retriever = VectorRetriever::new(Arc::new(MockProvider::new(256)), store);
        let results = retriever.retrieve("capital of France", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "Paris is the capital of France.");
        assert_eq!(results[0].score_kind, ScoreKind::Similarity);
    }

    #[tokio::test]
    async fn test_retriever_on_empty_store_is_not_ready() {
        let retriever = VectorRetriever::new(
            Arc::new(MockProvider::new(16)),
            Arc::new(InMemoryStore::new(SimilarityMetric::L2)),
        );

        assert!(matches!(
            retriever.retrieve("anything", 5).await,
            Err(AppError::StoreNotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let settings = StoreSettings {
            backend: StoreBackend::Memory,
            ..Default::default()
        };
        let store = create_store(&settings, 8).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(!store.is_ready().await.unwrap());
    }
}
