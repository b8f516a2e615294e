//! Engine statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of the hybrid engine's indexes and subsystems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchStats {
    /// Documents in the resident corpus.
    pub total_documents: usize,
    /// Distinct terms in the lexical index.
    pub vocabulary_size: usize,
    /// Average document length in tokens.
    pub avg_doc_length: f32,
    /// Engine lifecycle state, lowercase.
    pub state: String,
    /// Configured store family.
    pub store_type: String,
    /// Whether the vector store initialized and answers health probes.
    pub vector_store_available: bool,
    /// Vectors held by the backend, when it can report them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_count: Option<usize>,
    /// Whether reranking is enabled in config.
    pub reranking_enabled: bool,
    /// Whether the reranker subsystem initialized successfully.
    pub reranking_available: bool,
    /// Wall-clock time of the last successful index mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed_at: Option<DateTime<Utc>>,
}

impl HybridSearchStats {
    /// Flatten into the string-keyed map exposed by the query API.
    pub fn into_map(self) -> HashMap<String, Value> {
        match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }
}
