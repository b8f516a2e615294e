//! Vector storage abstraction.
//!
//! Concrete vector databases (Qdrant, Chroma, Milvus, Pinecone, ...) are
//! opaque stores behind the [`VectorBackend`] driver contract. The
//! [`VectorStore`] adapter wraps one driver, owns embedding delegation, and
//! absorbs backend failures: callers see an empty result list, never an
//! error. An in-memory reference backend is shipped here; real database
//! drivers live with the application.

pub mod backend;
pub mod memory;
pub mod store;

pub use backend::{VectorBackend, VectorCollectionStats};
pub use memory::MemoryBackend;
pub use store::VectorStore;

/// Cosine similarity between two vectors.
///
/// Mismatched lengths and zero-norm inputs score 0.0 rather than erroring,
/// matching the "no evidence" semantics of the vector path.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
