//! Feature-hashing embedder.
//!
//! A lightweight, deterministic embedder that buckets tokens into a
//! fixed-dimension vector by hash and L2-normalizes the result. It needs no
//! model download or training, which makes it the default for tests and for
//! deployments that have not wired a neural embedder yet. Vectors capture
//! term overlap only, not semantics.

use std::hash::{Hash, Hasher};

use ahash::AHasher;
use async_trait::async_trait;

use crate::embedding::provider::QueryEmbedder;
use crate::error::{Result, SagittaError};
use crate::lexical::tokenizer::tokenize;

/// Deterministic token-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder with the given output dimensionality.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(SagittaError::config(
                "hashing embedder dimension must be non-zero",
            ));
        }
        Ok(Self { dimension })
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = AHasher::default();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

#[async_trait]
impl QueryEmbedder for HashingEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in tokenize(text, 1) {
            vector[self.bucket(&token)] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing-embedder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let a = embedder.embed_query("GET /users returns list").await.unwrap();
        let b = embedder.embed_query("GET /users returns list").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_normalized() {
        let embedder = HashingEmbedder::new(32).unwrap();
        let vector = embedder.embed_query("rate limiting applies").await.unwrap();
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        let vector = embedder.embed_query("").await.unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[tokio::test]
    async fn test_overlapping_texts_are_closer() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let a = embedder.embed_query("list users endpoint").await.unwrap();
        let b = embedder.embed_query("users endpoint list").await.unwrap();
        let c = embedder.embed_query("rate limiting window").await.unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(p, q)| p * q).sum() };
        assert!(dot(&a, &b) > dot(&a, &c));
    }
}
