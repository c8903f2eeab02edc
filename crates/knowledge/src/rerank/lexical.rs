//! Offline term-overlap reranker.

use super::Reranker;
use async_trait::async_trait;
use docqa_core::AppResult;
use std::collections::HashSet;

/// Scores a passage by the fraction of distinct query terms it contains.
///
/// Scores fall in `[0, 1]`. A query with no usable terms scores every
/// passage 0.
#[derive(Debug, Default)]
pub struct LexicalReranker;

impl LexicalReranker {
    pub fn new() -> Self {
        Self
    }

    fn terms(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2)
            .map(str::to_string)
            .collect()
    }

    fn score(query_terms: &HashSet<String>, passage: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let passage_terms = Self::terms(passage);
        let shared = query_terms.intersection(&passage_terms).count();
        shared as f32 / query_terms.len() as f32
    }
}

#[async_trait]
impl Reranker for LexicalReranker {
    fn model_name(&self) -> &str {
        "lexical-overlap"
    }

    async fn rerank(&self, query: &str, passages: &[String]) -> AppResult<Vec<f32>> {
        let query_terms = Self::terms(query);
        Ok(passages
            .iter()
            .map(|p| Self::score(&query_terms, p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_overlap_scores() {
        let reranker = LexicalReranker::new();
        let passages = vec![
            "Pasta should be cooked al dente.".to_string(),
            "Paris is the capital of France.".to_string(),
            "France borders Spain.".to_string(),
        ];

        let scores = reranker
            .rerank("What is the capital of France?", &passages)
            .await
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 0.0);
        assert!(scores[1] > scores[2]);
        assert!(scores[2] > 0.0);
    }

    #[tokio::test]
    async fn test_query_without_terms() {
        let reranker = LexicalReranker::new();
        let scores = reranker.rerank("a b ?", &["anything".to_string()]).await.unwrap();
        assert_eq!(scores, vec![0.0]);
    }
}
