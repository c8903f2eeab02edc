//! Pipeline ordering, short-circuit and failure behavior.

use super::*;
use crate::rag::{PipelineOptions, QueryResult, RagPipeline};
use docqa_prompt::PromptTemplate;
use std::sync::Arc;

fn options(top_k_retrieval: usize, top_k_ranking: usize) -> PipelineOptions {
    PipelineOptions {
        top_k_retrieval,
        top_k_ranking,
        model: "test-model".to_string(),
        temperature: 0.0,
        max_tokens: 64,
        rerank_timeout: Duration::from_secs(5),
        generation_timeout: Duration::from_secs(5),
    }
}

fn pipeline(
    retriever: Arc<FixedRetriever>,
    reranker: Arc<ScriptedReranker>,
    llm: Arc<ScriptedLlm>,
    options: PipelineOptions,
) -> RagPipeline {
    RagPipeline::new(
        retriever,
        reranker,
        llm,
        PromptTemplate::default_answer().unwrap(),
        options,
    )
    .unwrap()
}

fn abc() -> Vec<ScoredChunk> {
    vec![
        candidate("Alpha text", "a.txt"),
        candidate("Bravo text", "b.txt"),
        candidate("Charlie text", "c.txt"),
    ]
}

#[tokio::test]
async fn test_sources_follow_relevance_and_top_k() {
    let llm = Arc::new(ScriptedLlm::replying("  Bravo.  \n"));
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.2, 0.9, 0.5])),
        llm.clone(),
        options(10, 2),
    );

    let result = pipeline.answer("Which one?").await.unwrap();

    assert_eq!(result.answer, "Bravo.");
    let texts: Vec<&str> = result.sources.iter().map(|s| s.chunk_text.as_str()).collect();
    assert_eq!(texts, vec!["Bravo text", "Charlie text"]);
    assert_eq!(result.sources[0].source(), Some("b.txt"));
    assert_eq!(result.sources[0].relevance_score, 0.9);

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Bravo text\n\nCharlie text"));
    assert!(prompts[0].contains("Which one?"));
    assert!(!prompts[0].contains("Alpha text"));
}

#[tokio::test]
async fn test_empty_retrieval_skips_rerank_and_generation() {
    let reranker = Arc::new(ScriptedReranker::new(vec![]));
    let llm = Arc::new(ScriptedLlm::replying("should not be used"));
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(vec![])),
        reranker.clone(),
        llm.clone(),
        options(10, 5),
    );

    let result = pipeline.answer("anything").await.unwrap();

    assert_eq!(result, QueryResult::no_answer());
    assert_eq!(llm.call_count(), 0);
    assert_eq!(reranker.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sources_len_is_min_of_k_and_candidates() {
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(vec![candidate("only", "a.txt")])),
        Arc::new(ScriptedReranker::new(vec![0.3])),
        Arc::new(ScriptedLlm::replying("ok")),
        options(10, 5),
    );

    let result = pipeline.answer("q").await.unwrap();
    assert_eq!(result.sources.len(), 1);
}

#[tokio::test]
async fn test_store_not_ready_propagates() {
    let llm = Arc::new(ScriptedLlm::replying("unused"));
    let pipeline = pipeline(
        Arc::new(FixedRetriever::not_ready()),
        Arc::new(ScriptedReranker::new(vec![])),
        llm.clone(),
        options(10, 5),
    );

    assert!(matches!(
        pipeline.answer("q").await,
        Err(AppError::StoreNotReady(_))
    ));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_empty_query_rejected_before_retrieval() {
    let retriever = Arc::new(FixedRetriever::with(abc()));
    let pipeline = pipeline(
        retriever.clone(),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2, 0.3])),
        Arc::new(ScriptedLlm::replying("unused")),
        options(10, 5),
    );

    assert!(matches!(pipeline.answer("   ").await, Err(AppError::Input(_))));
    assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_score_count_mismatch_is_rerank_failure() {
    let llm = Arc::new(ScriptedLlm::replying("unused"));
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2])),
        llm.clone(),
        options(10, 5),
    );

    assert!(matches!(pipeline.answer("q").await, Err(AppError::Rerank(_))));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_rerank_timeout() {
    let mut opts = options(10, 5);
    opts.rerank_timeout = Duration::from_millis(50);
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::slow(vec![0.1, 0.2, 0.3], Duration::from_secs(5))),
        Arc::new(ScriptedLlm::replying("unused")),
        opts,
    );

    assert!(matches!(pipeline.answer("q").await, Err(AppError::Rerank(_))));
}

#[tokio::test]
async fn test_generation_timeout() {
    let mut opts = options(10, 5);
    opts.generation_timeout = Duration::from_millis(50);
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2, 0.3])),
        Arc::new(ScriptedLlm::slow("late", Duration::from_secs(5))),
        opts,
    );

    assert!(matches!(
        pipeline.answer("q").await,
        Err(AppError::Generation(_))
    ));
}

#[tokio::test]
async fn test_llm_error_and_blank_answer_are_generation_failures() {
    let failing = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2, 0.3])),
        Arc::new(ScriptedLlm::failing("connection refused")),
        options(10, 5),
    );
    assert!(matches!(
        failing.answer("q").await,
        Err(AppError::Generation(_))
    ));

    let blank = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2, 0.3])),
        Arc::new(ScriptedLlm::replying(" \n ")),
        options(10, 5),
    );
    assert!(matches!(blank.answer("q").await, Err(AppError::Generation(_))));
}

#[tokio::test]
async fn test_answer_until_cancelled() {
    let pipeline = pipeline(
        Arc::new(FixedRetriever::with(abc())),
        Arc::new(ScriptedReranker::new(vec![0.1, 0.2, 0.3])),
        Arc::new(ScriptedLlm::slow("late", Duration::from_secs(5))),
        options(10, 5),
    );

    let result = pipeline
        .answer_until("q", tokio::time::sleep(Duration::from_millis(20)))
        .await;
    assert!(matches!(result, Err(AppError::Cancelled)));
}

#[tokio::test]
async fn test_identical_inputs_give_identical_results() {
    let make = || {
        pipeline(
            Arc::new(FixedRetriever::with(abc())),
            Arc::new(ScriptedReranker::new(vec![0.4, 0.4, 0.7])),
            Arc::new(ScriptedLlm::replying("same")),
            options(10, 3),
        )
    };

    let first = make().answer("q").await.unwrap();
    let second = make().answer("q").await.unwrap();
    let order = |r: &QueryResult| -> Vec<String> {
        r.sources.iter().map(|s| s.chunk_text.clone()).collect()
    };
    assert_eq!(order(&first), order(&second));
    assert_eq!(order(&first), vec!["Charlie text", "Alpha text", "Bravo text"]);
}

#[test]
fn test_invalid_top_k_rejected() {
    let result = RagPipeline::new(
        Arc::new(FixedRetriever::with(vec![])),
        Arc::new(ScriptedReranker::new(vec![])),
        Arc::new(ScriptedLlm::replying("")),
        PromptTemplate::default_answer().unwrap(),
        options(2, 5),
    );
    assert!(matches!(result, Err(AppError::Config(_))));

    let zero = RagPipeline::new(
        Arc::new(FixedRetriever::with(vec![])),
        Arc::new(ScriptedReranker::new(vec![])),
        Arc::new(ScriptedLlm::replying("")),
        PromptTemplate::default_answer().unwrap(),
        options(5, 0),
    );
    assert!(matches!(zero, Err(AppError::Config(_))));
}
