//! Vector database driver contract.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, SearchResult};
use crate::error::Result;

/// Statistics reported by a vector backend for its collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorCollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of stored vectors.
    pub vector_count: usize,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Backend-specific extras.
    #[serde(default)]
    pub extra: HashMap<String, Value>,
}

/// Contract every concrete vector database driver must satisfy.
///
/// Documents passed to `add_documents`/`update_document` always carry an
/// embedding; the [`VectorStore`](crate::vector::VectorStore) adapter fills
/// missing ones before delegating. Drivers return errors freely; absorption
/// into empty results happens one layer up in the adapter.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Establish the backend connection.
    async fn initialize(&self) -> Result<()>;

    /// Create (or open) the named collection with the given dimensionality.
    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()>;

    /// Store a batch of embedded documents, replacing any with the same id.
    async fn add_documents(&self, documents: &[Document]) -> Result<()>;

    /// Nearest-neighbor search by raw vector, optionally filtered by
    /// metadata equality.
    async fn search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<SearchResult>>;

    /// Delete documents by id. Returns the number actually removed.
    async fn delete_documents(&self, ids: &[String]) -> Result<usize>;

    /// Replace a single stored document.
    async fn update_document(&self, document: &Document) -> Result<()>;

    /// Fetch a stored document by id.
    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Collection statistics.
    async fn collection_stats(&self) -> Result<VectorCollectionStats>;

    /// Cheap health probe.
    async fn is_available(&self) -> bool;

    /// Driver name used in logs and stats.
    fn name(&self) -> &str;
}
