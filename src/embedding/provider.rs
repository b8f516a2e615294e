//! The three-variant embedding function contract.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Embedder optimized for batches of documents.
#[async_trait]
pub trait BatchEmbedder: Send + Sync {
    /// Embed a batch of texts, one vector per input.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output vector dimensionality.
    fn dimension(&self) -> usize;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "batch-embedder"
    }
}

/// Embedder that handles one text at a time.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    /// Embed a single text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Output vector dimensionality.
    fn dimension(&self) -> usize;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "query-embedder"
    }
}

/// A raw synchronous embedding callable.
pub type RawEmbedFn = Arc<dyn Fn(&str) -> Result<Vec<f32>> + Send + Sync>;

/// The injected embedding function, resolved to its capability shape once at
/// configuration time.
#[derive(Clone)]
pub enum EmbeddingProvider {
    /// Batch-document embedding; queries go through a batch of one.
    Batch(Arc<dyn BatchEmbedder>),
    /// Single-text embedding; document batches are embedded sequentially.
    Query(Arc<dyn QueryEmbedder>),
    /// A bare callable with a declared dimensionality.
    Raw {
        /// The callable.
        f: RawEmbedFn,
        /// Output vector dimensionality.
        dimension: usize,
    },
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Batch(e) => write!(f, "EmbeddingProvider::Batch({})", e.name()),
            EmbeddingProvider::Query(e) => write!(f, "EmbeddingProvider::Query({})", e.name()),
            EmbeddingProvider::Raw { dimension, .. } => {
                write!(f, "EmbeddingProvider::Raw(dimension={dimension})")
            }
        }
    }
}

impl EmbeddingProvider {
    /// Output vector dimensionality.
    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingProvider::Batch(e) => e.dimension(),
            EmbeddingProvider::Query(e) => e.dimension(),
            EmbeddingProvider::Raw { dimension, .. } => *dimension,
        }
    }

    /// The all-zero vector used when embedding fails entirely.
    pub fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dimension()]
    }

    /// Embed a batch of document texts.
    ///
    /// Always returns one vector per input. Inputs that cannot be embedded
    /// come back as zero vectors; the failure is logged, never propagated.
    pub async fn embed_documents(&self, texts: &[String]) -> Vec<Vec<f32>> {
        match self {
            EmbeddingProvider::Batch(embedder) => {
                match embedder.embed_documents(texts).await {
                    Ok(vectors) if vectors.len() == texts.len() => vectors,
                    Ok(vectors) => {
                        warn!(
                            embedder = embedder.name(),
                            expected = texts.len(),
                            got = vectors.len(),
                            "batch embedder returned wrong count, padding with zero vectors"
                        );
                        let mut padded = vectors;
                        padded.resize(texts.len(), self.zero_vector());
                        padded
                    }
                    Err(e) => {
                        warn!(embedder = embedder.name(), error = %e, "batch embedding failed");
                        vec![self.zero_vector(); texts.len()]
                    }
                }
            }
            EmbeddingProvider::Query(_) | EmbeddingProvider::Raw { .. } => {
                let mut vectors = Vec::with_capacity(texts.len());
                for text in texts {
                    vectors.push(self.embed_query(text).await);
                }
                vectors
            }
        }
    }

    /// Embed a single query text, falling back to the zero vector on failure.
    pub async fn embed_query(&self, text: &str) -> Vec<f32> {
        let result = match self {
            EmbeddingProvider::Batch(embedder) => embedder
                .embed_documents(std::slice::from_ref(&text.to_string()))
                .await
                .and_then(|mut vectors| {
                    vectors.pop().ok_or_else(|| {
                        crate::error::SagittaError::embedding("batch embedder returned no vector")
                    })
                }),
            EmbeddingProvider::Query(embedder) => embedder.embed_query(text).await,
            EmbeddingProvider::Raw { f, .. } => f(text),
        };

        match result {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed, using zero vector");
                self.zero_vector()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SagittaError;

    struct FailingEmbedder;

    #[async_trait]
    impl QueryEmbedder for FailingEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SagittaError::embedding("model unavailable"))
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    struct DoublingBatchEmbedder;

    #[async_trait]
    impl BatchEmbedder for DoublingBatchEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32; 2]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_query_via_batch_shape() {
        let provider = EmbeddingProvider::Batch(Arc::new(DoublingBatchEmbedder));
        let vector = provider.embed_query("abc").await;
        assert_eq!(vector, vec![3.0, 3.0]);
    }

    #[tokio::test]
    async fn test_batch_via_query_shape() {
        let provider = EmbeddingProvider::Query(Arc::new(FailingEmbedder));
        let vectors = provider
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await;
        // Failure shape: one zero vector per input, never an error.
        assert_eq!(vectors, vec![vec![0.0; 4], vec![0.0; 4]]);
    }

    #[tokio::test]
    async fn test_raw_callable() {
        let provider = EmbeddingProvider::Raw {
            f: Arc::new(|text: &str| Ok(vec![text.len() as f32])),
            dimension: 1,
        };
        assert_eq!(provider.embed_query("hello").await, vec![5.0]);
        assert_eq!(provider.dimension(), 1);
    }

    #[tokio::test]
    async fn test_zero_vector_fallback_dimension() {
        let provider = EmbeddingProvider::Query(Arc::new(FailingEmbedder));
        let vector = provider.embed_query("anything").await;
        assert_eq!(vector.len(), 4);
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
