//! Semantic reranker.
//!
//! Prefers a cross-encoder scoring `(query, document)` pairs jointly, which
//! is more accurate than comparing independently-produced embeddings. When
//! no cross-encoder is wired (or it fails), falls back to embedding cosine
//! similarity blended with the incoming score.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::rerank::cache::RerankCache;
use crate::rerank::config::RerankerConfig;
use crate::rerank::{RerankContext, Reranker};
use crate::vector::cosine_similarity;

/// Weight of the incoming score in the embedding-cosine fallback blend.
const ORIGINAL_WEIGHT: f32 = 0.3;

/// Weight of the cosine similarity in the embedding-cosine fallback blend.
const COSINE_WEIGHT: f32 = 0.7;

/// A model scoring query/document pairs jointly.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score each `(query, document)` pair; one score per document.
    async fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>>;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "cross-encoder"
    }
}

/// Cross-encoder reranker with an embedding-cosine fallback.
pub struct SemanticReranker {
    config: RerankerConfig,
    cross_encoder: Option<Arc<dyn CrossEncoder>>,
    embedding: EmbeddingProvider,
    cache: Option<RerankCache>,
}

impl SemanticReranker {
    /// Create a semantic reranker.
    pub fn new(
        config: RerankerConfig,
        cross_encoder: Option<Arc<dyn CrossEncoder>>,
        embedding: EmbeddingProvider,
    ) -> Self {
        let cache = (config.cache_ttl_secs > 0)
            .then(|| RerankCache::new(Duration::from_secs(config.cache_ttl_secs)));
        Self {
            config,
            cross_encoder,
            embedding,
            cache,
        }
    }

    fn truncated_contents(&self, results: &[SearchResult]) -> Vec<String> {
        results
            .iter()
            .map(|r| {
                r.document
                    .content
                    .chars()
                    .take(self.config.max_content_chars)
                    .collect()
            })
            .collect()
    }

    async fn cross_encoder_scores(
        &self,
        query: &str,
        contents: &[String],
    ) -> Option<Vec<f32>> {
        let encoder = self.cross_encoder.as_ref()?;
        match encoder.score_pairs(query, contents).await {
            Ok(scores) if scores.len() == contents.len() => Some(scores),
            Ok(_) => {
                debug!(
                    encoder = encoder.name(),
                    "cross-encoder returned wrong score count, using embedding fallback"
                );
                None
            }
            Err(e) => {
                debug!(encoder = encoder.name(), error = %e, "cross-encoder failed, using embedding fallback");
                None
            }
        }
    }

    async fn embedding_scores(
        &self,
        query: &str,
        contents: &[String],
        results: &[SearchResult],
    ) -> Vec<f32> {
        let query_vector = self.embedding.embed_query(query).await;
        let doc_vectors = self.embedding.embed_documents(contents).await;
        results
            .iter()
            .zip(&doc_vectors)
            .map(|(result, doc_vector)| {
                let cosine = cosine_similarity(&query_vector, doc_vector);
                ORIGINAL_WEIGHT * result.score + COSINE_WEIGHT * cosine
            })
            .collect()
    }
}

#[async_trait]
impl Reranker for SemanticReranker {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        _context: &RerankContext,
    ) -> Result<Vec<SearchResult>> {
        if results.is_empty() {
            return Ok(results);
        }

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(query, &results)
        {
            debug!(stage = self.name(), "rerank cache hit");
            return Ok(hit);
        }

        let input = results.clone();
        let contents = self.truncated_contents(&results);

        let (scores, method) = match self.cross_encoder_scores(query, &contents).await {
            Some(scores) => (scores, "cross_encoder"),
            None => (
                self.embedding_scores(query, &contents, &results).await,
                "embedding_cosine",
            ),
        };

        let mut reranked = results;
        for (result, score) in reranked.iter_mut().zip(scores) {
            result.annotate("original_score", result.score as f64);
            result.annotate("rerank_stage", self.config.name.clone());
            result.annotate("rerank_method", method);
            result.score = score;
        }

        reranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if self.config.threshold > 0.0 {
            reranked.retain(|r| r.score >= self.config.threshold);
        }

        if let Some(cache) = &self.cache {
            cache.put(query, &input, reranked.clone());
        }
        Ok(reranked)
    }
}
