//! # Sagitta
//!
//! A hybrid lexical/vector search and fusion engine for API documentation
//! retrieval, built for RAG pipelines.
//!
//! ## Features
//!
//! - In-memory BM25 lexical index
//! - Uniform vector store adapter over pluggable database drivers
//! - Reciprocal Rank Fusion of per-source rankings
//! - Pluggable reranker pipelines (cross-encoder, LLM judge, API-docs heuristic)
//! - Layered degradation: reranker → RRF → lexical-only → empty

pub mod document;
pub mod embedding;
pub mod error;
pub mod fusion;
pub mod hybrid;
pub mod lexical;
pub mod llm;
pub mod rerank;
pub mod vector;

pub mod prelude {
    //! Convenience re-exports for typical usage.
    pub use crate::document::{Document, SearchResult};
    pub use crate::error::{Result, SagittaError};
    pub use crate::hybrid::{EngineState, HybridEngine, HybridSearchConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
