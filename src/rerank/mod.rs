//! Reranking pipeline.
//!
//! Rerankers are post-retrieval stages that reorder a candidate set with a
//! more expensive or more targeted relevance signal. They are created by
//! type from a [`RerankerConfig`], registered by name in an explicit
//! [`RerankerRegistry`] owned by the orchestrator, and composed into named
//! pipelines executed strictly in sequence.
//!
//! Stage failures are isolated: a stage that errors, times out, or returns
//! malformed output is skipped (the pre-stage ordering is kept) and the
//! pipeline continues. A broken reranker never aborts a search.

pub mod api_docs;
pub mod cache;
pub mod config;
pub mod llm;
pub mod registry;
pub mod semantic;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::SearchResult;
use crate::error::Result;

pub use api_docs::{ApiDocsReranker, QueryIntent};
pub use cache::RerankCache;
pub use config::{PromptTemplate, RerankerConfig, RerankerType};
pub use llm::LlmReranker;
pub use registry::{RerankerDeps, RerankerRegistry};
pub use semantic::{CrossEncoder, SemanticReranker};

/// Shared context passed to every stage of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RerankContext {
    /// The user query driving this search.
    pub query: String,
    /// Metadata filter in effect for the search, if any.
    pub filter: Option<HashMap<String, Value>>,
}

impl RerankContext {
    /// Context for a bare query with no filter.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
        }
    }
}

/// A single reranking stage.
///
/// Implementations may reorder, rescore, and annotate the passed-in results
/// but must not assume any particular scale for incoming scores; they may be
/// raw BM25, cosine similarity, or a previous stage's output.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Registry name of this instance.
    fn name(&self) -> &str;

    /// Produce a new ordering of `results` for `query`.
    async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        context: &RerankContext,
    ) -> Result<Vec<SearchResult>>;
}
