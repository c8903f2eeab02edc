//! Retrieve, rerank, generate.

use crate::rag::types::{QueryResult, SourceAttribution};
use crate::rerank::Reranker;
use crate::store::Retriever;
use crate::types::{RerankedChunk, ScoredChunk};
use docqa_core::{AppError, AppResult, Settings};
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::PromptTemplate;
use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Tunables the pipeline reads but does not own.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub top_k_retrieval: usize,
    pub top_k_ranking: usize,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub rerank_timeout: Duration,
    pub generation_timeout: Duration,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top_k_retrieval: settings.retrieval.top_k_retrieval,
            top_k_ranking: settings.retrieval.top_k_ranking,
            model: settings.generation.model.clone(),
            temperature: settings.generation.temperature,
            max_tokens: settings.generation.max_tokens,
            rerank_timeout: Duration::from_secs(settings.reranker.timeout_secs),
            generation_timeout: Duration::from_secs(settings.generation.timeout_secs),
        }
    }
}

/// Answers questions from ingested documents.
///
/// Each query makes one retrieval call, one batched rerank call and at most
/// one generation call. Nothing is cached between queries.
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    options: PipelineOptions,
}

impl RagPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        reranker: Arc<dyn Reranker>,
        llm: Arc<dyn LlmClient>,
        template: PromptTemplate,
        options: PipelineOptions,
    ) -> AppResult<Self> {
        if options.top_k_ranking == 0 || options.top_k_retrieval < options.top_k_ranking {
            return Err(AppError::Config(format!(
                "top_k_retrieval ({}) must be >= top_k_ranking ({}) > 0",
                options.top_k_retrieval, options.top_k_ranking
            )));
        }

        Ok(Self {
            retriever,
            reranker,
            llm,
            template,
            options,
        })
    }

    /// Answer `query` using only retrieved context.
    ///
    /// Returns `QueryResult::no_answer()` without calling the LLM when the
    /// store has chunks but none were retrieved.
    #[instrument(
        skip(self),
        fields(
            top_k_retrieval = self.options.top_k_retrieval,
            top_k_ranking = self.options.top_k_ranking
        )
    )]
    pub async fn answer(&self, query: &str) -> AppResult<QueryResult> {
        if query.trim().is_empty() {
            return Err(AppError::Input("Query must not be empty".to_string()));
        }

        let started = Instant::now();

        let candidates = self
            .retriever
            .retrieve(query, self.options.top_k_retrieval)
            .await
            .map_err(|e| match e {
                AppError::StoreNotReady(_) | AppError::Retrieval(_) => e,
                other => AppError::Retrieval(other.to_string()),
            })?;

        if candidates.is_empty() {
            info!("No candidates retrieved, skipping generation");
            return Ok(QueryResult::no_answer());
        }
        debug!("Retrieved {} candidates", candidates.len());

        let ranked = self.rerank(query, candidates).await?;
        let context = build_context(&ranked);
        let prompt = self.template.render(&context, query)?;
        let answer = self.generate(prompt).await?;

        info!(
            sources = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered query"
        );

        Ok(QueryResult {
            answer,
            sources: ranked.into_iter().map(SourceAttribution::from).collect(),
        })
    }

    /// Like `answer`, but gives up with `AppError::Cancelled` once `cancel`
    /// completes. In-flight calls are dropped.
    pub async fn answer_until<F>(&self, query: &str, cancel: F) -> AppResult<QueryResult>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.answer(query) => result,
            _ = cancel => {
                info!("Query cancelled by caller");
                Err(AppError::Cancelled)
            }
        }
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredChunk>,
    ) -> AppResult<Vec<RerankedChunk>> {
        let passages: Vec<String> = candidates.iter().map(|c| c.chunk.text.clone()).collect();

        let scores = tokio::time::timeout(
            self.options.rerank_timeout,
            self.reranker.rerank(query, &passages),
        )
        .await
        .map_err(|_| {
            AppError::Rerank(format!(
                "Reranker timed out after {:?}",
                self.options.rerank_timeout
            ))
        })?
        .map_err(|e| match e {
            AppError::Rerank(_) => e,
            other => AppError::Rerank(other.to_string()),
        })?;

        rank_and_truncate(candidates, scores, self.options.top_k_ranking)
    }

    async fn generate(&self, prompt: String) -> AppResult<String> {
        let request = LlmRequest::new(prompt, &self.options.model)
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens);

        let response = tokio::time::timeout(
            self.options.generation_timeout,
            self.llm.complete(&request),
        )
        .await
        .map_err(|_| {
            AppError::Generation(format!(
                "{} timed out after {:?}",
                self.llm.provider_name(),
                self.options.generation_timeout
            ))
        })?
        .map_err(|e| AppError::Generation(e.to_string()))?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(AppError::Generation(
                "Model returned an empty answer".to_string(),
            ));
        }

        Ok(answer.to_string())
    }
}

/// Attach scores by position, sort by relevance (stable, NaN last), keep `k`.
pub fn rank_and_truncate(
    candidates: Vec<ScoredChunk>,
    scores: Vec<f32>,
    k: usize,
) -> AppResult<Vec<RerankedChunk>> {
    if scores.len() != candidates.len() {
        return Err(AppError::Rerank(format!(
            "Expected {} scores, got {}",
            candidates.len(),
            scores.len()
        )));
    }

    let mut ranked: Vec<RerankedChunk> = candidates
        .into_iter()
        .zip(scores)
        .map(|(candidate, score)| RerankedChunk::from_scored(candidate, score))
        .collect();

    ranked.sort_by(|a, b| relevance_desc(a.relevance_score, b.relevance_score));
    ranked.truncate(k);
    Ok(ranked)
}

fn relevance_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Chunk texts in rank order, separated by blank lines.
pub fn build_context(ranked: &[RerankedChunk]) -> String {
    ranked
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
