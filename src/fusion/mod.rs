//! Result fusion.
//!
//! Scores produced by different retrieval methods live on incomparable
//! scales (raw BM25 vs cosine similarity), so the primary fusion method is
//! rank-based Reciprocal Rank Fusion. The weighted score combination is the
//! legacy path, kept for callers that opt out of both RRF and reranking.

pub mod rrf;
pub mod weighted;

pub use rrf::rrf_fuse;
pub use weighted::{ScoreNormalization, WeightedMerger};
