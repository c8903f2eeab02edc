//! Ingest a directory, then answer from it, with only offline collaborators.

use super::*;
use crate::chunker::Chunker;
use crate::embeddings::MockProvider;
use crate::ingest::IngestionService;
use crate::rerank::LexicalReranker;
use crate::services::Services;
use crate::store::{InMemoryStore, VectorStore};
use docqa_core::{Settings, SimilarityMetric};
use docqa_prompt::PromptTemplate;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn services(llm: Arc<ScriptedLlm>, files: &TempDir) -> Services {
    let mut settings = Settings::default();
    settings.files_directory = files.path().to_path_buf();
    settings.retrieval.top_k_retrieval = 3;
    settings.retrieval.top_k_ranking = 1;

    Services::from_parts(
        &settings,
        Arc::new(MockProvider::new(128)),
        Arc::new(InMemoryStore::new(SimilarityMetric::Cosine)),
        Arc::new(LexicalReranker::new()),
        llm,
        PromptTemplate::default_answer().unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_ingest_then_query() {
    let files = TempDir::new().unwrap();
    fs::write(
        files.path().join("france.txt"),
        "Paris is the capital of France.",
    )
    .unwrap();
    fs::write(
        files.path().join("cooking.txt"),
        "Pasta should be cooked al dente in salted water.",
    )
    .unwrap();
    fs::write(files.path().join("slides.pptx"), b"binary").unwrap();

    let llm = Arc::new(ScriptedLlm::replying("Paris."));
    let services = services(llm.clone(), &files);

    let report = services
        .ingestion
        .ingest_directory(&services.files_directory)
        .await
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed.len(), 1);
    assert!(services.store.is_ready().await.unwrap());

    let result = services
        .pipeline
        .answer("What is the capital of France?")
        .await
        .unwrap();

    assert_eq!(result.answer, "Paris.");
    assert_eq!(result.sources.len(), 1);
    assert!(result.sources[0].source().unwrap().ends_with("france.txt"));
    assert_eq!(result.sources[0].chunk_text, "Paris is the capital of France.");

    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Paris is the capital of France."));
    assert!(!prompts[0].contains("Pasta"));
}

#[tokio::test]
async fn test_query_before_ingest_is_not_ready() {
    let files = TempDir::new().unwrap();
    let llm = Arc::new(ScriptedLlm::replying("unused"));
    let services = services(llm.clone(), &files);

    assert!(!services.store.is_ready().await.unwrap());
    assert!(matches!(
        services.pipeline.answer("anything?").await,
        Err(AppError::StoreNotReady(_))
    ));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_ingestion_is_serialized() {
    let files = TempDir::new().unwrap();
    fs::write(files.path().join("a.txt"), "alpha").unwrap();
    fs::write(files.path().join("b.txt"), "bravo").unwrap();

    let store = Arc::new(OverlapStore::new(
        InMemoryStore::new(SimilarityMetric::L2),
        Duration::from_millis(20),
    ));
    let ingestion = IngestionService::new(
        Chunker::new(200, 20).unwrap(),
        Arc::new(MockProvider::new(32)),
        store.clone(),
        8,
    );

    let (first, second) = tokio::join!(
        ingestion.ingest_directory(files.path()),
        ingestion.ingest_directory(files.path())
    );

    assert_eq!(first.unwrap().chunks_added, 2);
    assert_eq!(second.unwrap().chunks_added, 2);
    assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(store.count().await.unwrap(), 4);
}
