//! Configuration for hybrid search.

use serde::{Deserialize, Serialize};

use crate::fusion::ScoreNormalization;
use crate::fusion::rrf::DEFAULT_RRF_K;
use crate::lexical::Bm25Config;

/// The vector database family backing the store.
///
/// Unknown values fail at deserialization time; a supported type whose
/// driver is not wired at runtime downgrades to `Memory` during
/// initialization instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory brute-force store.
    #[default]
    Memory,
    /// Qdrant.
    Qdrant,
    /// Chroma.
    Chroma,
    /// Milvus.
    Milvus,
    /// Pinecone.
    Pinecone,
}

impl StoreType {
    /// Lowercase name, as used in configs, logs, and stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Memory => "memory",
            StoreType::Qdrant => "qdrant",
            StoreType::Chroma => "chroma",
            StoreType::Milvus => "milvus",
            StoreType::Pinecone => "pinecone",
        }
    }
}

/// Tunable parameters for the hybrid engine.
///
/// `lexical_weight` and `vector_weight` only matter in the legacy weighted
/// combination path; RRF and reranking are rank-based and ignore them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchConfig {
    /// Weight for lexical scores in the legacy weighted merge.
    pub lexical_weight: f32,
    /// Weight for vector scores in the legacy weighted merge.
    pub vector_weight: f32,
    /// Candidates pulled from each sub-search before fusion or reranking.
    pub rerank_top_k: usize,
    /// Results returned by fusion before the caller's `k` truncation.
    pub final_top_k: usize,
    /// When false, every search is lexical-only.
    pub enable_hybrid: bool,
    /// When false, RRF fusion is used instead of the reranker pipeline.
    pub enable_reranking: bool,
    /// BM25 parameters for the lexical index.
    #[serde(default)]
    pub bm25: Bm25Config,
    /// RRF constant; larger values flatten the advantage of top ranks.
    pub rrf_k: f32,
    /// Name of the reranker pipeline to run.
    pub reranker_pipeline: String,
    /// Vector database family.
    #[serde(default)]
    pub store_type: StoreType,
    /// Vector collection name.
    pub collection: String,
    /// Embedding dimensionality used when no embedder is injected.
    pub embedding_dimension: usize,
    /// Minimum lexical score; results below it are dropped.
    #[serde(default)]
    pub min_score: f32,
    /// Budget per reranker stage, in milliseconds.
    pub stage_timeout_ms: u64,
    /// Normalization for the legacy weighted merge.
    pub normalization: ScoreNormalization,
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            lexical_weight: 0.6,
            vector_weight: 0.4,
            rerank_top_k: 20,
            final_top_k: 10,
            enable_hybrid: true,
            enable_reranking: true,
            bm25: Bm25Config::default(),
            rrf_k: DEFAULT_RRF_K,
            reranker_pipeline: "default".to_string(),
            store_type: StoreType::default(),
            collection: "documents".to_string(),
            embedding_dimension: 384,
            min_score: 0.0,
            stage_timeout_ms: 30_000,
            normalization: ScoreNormalization::MinMax,
        }
    }
}
