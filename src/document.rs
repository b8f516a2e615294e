//! Core document and search result types.
//!
//! A [`Document`] is the unit of indexing: the same logical document is
//! replicated into the lexical index and the vector store, keyed by its
//! string id. A [`SearchResult`] is transient, created per query, and carries
//! a mutable metadata map used to tag provenance and reranking diagnostics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Metadata key under which result provenance is recorded.
pub const SOURCE_KEY: &str = "source";

/// Provenance value for results produced by the lexical index.
pub const SOURCE_BM25: &str = "bm25_search";

/// Provenance value for results produced by the vector store.
pub const SOURCE_VECTOR: &str = "vector_search";

/// A document in the collection.
///
/// The `id` must be unique within a collection. The embedding is optional at
/// add time; the vector path computes it on demand before storage, while the
/// lexical path never needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Raw text content.
    pub content: String,
    /// Free-form metadata (document type, topic, source file, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// Pre-computed embedding, if the caller already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a new document with the given id and content.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            embedding: None,
        }
    }

    /// Create a new document with a generated v4 UUID as its id.
    pub fn with_generated_id(content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), content)
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a pre-computed embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A single ranked search result.
///
/// `metadata` is an annotation field: the orchestrator tags provenance under
/// [`SOURCE_KEY`], and reranker stages append their own diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Relevance score. The scale depends on which stage produced it.
    pub score: f32,
    /// Provenance and diagnostic annotations.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new(document: Document, score: f32) -> Self {
        Self {
            document,
            score,
            metadata: HashMap::new(),
        }
    }

    /// Tag this result with a provenance source.
    pub fn with_source(mut self, source: &str) -> Self {
        self.metadata
            .insert(SOURCE_KEY.to_string(), Value::from(source));
        self
    }

    /// Set a metadata annotation.
    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// The provenance source, if tagged.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::new("d1", "GET /users returns list")
            .with_meta("type", "endpoint")
            .with_embedding(vec![0.1, 0.2]);

        assert_eq!(doc.id, "d1");
        assert_eq!(doc.content, "GET /users returns list");
        assert_eq!(doc.metadata.get("type").unwrap(), "endpoint");
        assert_eq!(doc.embedding.as_deref(), Some(&[0.1_f32, 0.2][..]));
    }

    #[test]
    fn test_generated_id_is_unique() {
        let a = Document::with_generated_id("a");
        let b = Document::with_generated_id("b");
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_result_provenance() {
        let doc = Document::new("d1", "content");
        let result = SearchResult::new(doc, 1.5).with_source(SOURCE_BM25);

        assert_eq!(result.source(), Some(SOURCE_BM25));
        assert_eq!(result.score, 1.5);
    }

    #[test]
    fn test_result_annotation() {
        let mut result = SearchResult::new(Document::new("d1", "c"), 0.5);
        result.annotate("rerank_stage", "semantic");
        assert_eq!(result.metadata.get("rerank_stage").unwrap(), "semantic");
    }

    #[test]
    fn test_document_serde_roundtrip() {
        let doc = Document::new("d1", "POST /users creates user").with_meta("topic", "users");
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "d1");
        assert!(back.embedding.is_none());
    }
}
