//! The vector store adapter.
//!
//! Wraps a concrete [`VectorBackend`] behind a uniform surface, owns
//! embedding delegation, and absorbs backend failures. Callers must treat an
//! empty result as "no evidence", not "index empty"; a separate
//! [`VectorStore::is_available`] probe distinguishes the two.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vector::backend::{VectorBackend, VectorCollectionStats};

/// Uniform adapter over any vector database driver.
pub struct VectorStore {
    backend: Arc<dyn VectorBackend>,
    embedding: EmbeddingProvider,
    collection: String,
}

impl VectorStore {
    /// Create an adapter over `backend`, embedding via `embedding`.
    pub fn new(
        backend: Arc<dyn VectorBackend>,
        embedding: EmbeddingProvider,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            embedding,
            collection: collection.into(),
        }
    }

    /// Connect the backend and open the collection.
    ///
    /// This is the one adapter call that propagates errors: the orchestrator
    /// uses the failure to enter degraded mode.
    pub async fn initialize(&self) -> Result<()> {
        self.backend.initialize().await?;
        self.backend
            .create_collection(&self.collection, self.embedding.dimension())
            .await
    }

    /// Store a batch of documents, embedding any that arrive without a
    /// vector. Returns `false` (logged) on backend failure.
    pub async fn add_documents(&self, documents: &[Document]) -> bool {
        let documents = self.ensure_embeddings(documents).await;
        match self.backend.add_documents(&documents).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    count = documents.len(),
                    error = %e,
                    "vector store add failed"
                );
                false
            }
        }
    }

    /// Semantic search by query text.
    ///
    /// Always implemented as `search_by_vector(embed(text), k)`.
    pub async fn search(
        &self,
        text: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Vec<SearchResult> {
        let vector = self.embedding.embed_query(text).await;
        self.search_by_vector(&vector, k, filter).await
    }

    /// Nearest-neighbor search by raw vector. Backend failures yield an
    /// empty list.
    pub async fn search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Vec<SearchResult> {
        match self.backend.search_by_vector(vector, k, filter).await {
            Ok(results) => results,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "vector search failed");
                Vec::new()
            }
        }
    }

    /// Delete documents by id. Returns `false` (logged) on backend failure.
    pub async fn delete_documents(&self, ids: &[String]) -> bool {
        match self.backend.delete_documents(ids).await {
            Ok(removed) => {
                debug!(backend = self.backend.name(), removed, "vector store delete");
                true
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "vector store delete failed");
                false
            }
        }
    }

    /// Replace a stored document, embedding it first if needed.
    pub async fn update_document(&self, document: &Document) -> bool {
        let documents = self.ensure_embeddings(std::slice::from_ref(document)).await;
        match self.backend.update_document(&documents[0]).await {
            Ok(()) => true,
            Err(e) => {
                warn!(backend = self.backend.name(), id = %document.id, error = %e, "vector store update failed");
                false
            }
        }
    }

    /// Fetch a stored document. Backend failure reads as absent.
    pub async fn get_document(&self, id: &str) -> Option<Document> {
        match self.backend.get_document(id).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(backend = self.backend.name(), id, error = %e, "vector store get failed");
                None
            }
        }
    }

    /// Collection statistics, if the backend can report them.
    pub async fn stats(&self) -> Option<VectorCollectionStats> {
        match self.backend.collection_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "vector store stats failed");
                None
            }
        }
    }

    /// Health probe, delegated to the driver.
    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    /// The embedding provider this store delegates to.
    pub fn embedding(&self) -> &EmbeddingProvider {
        &self.embedding
    }

    /// The driver name.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    async fn ensure_embeddings(&self, documents: &[Document]) -> Vec<Document> {
        let missing: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut documents = documents.to_vec();
        if missing.is_empty() {
            return documents;
        }

        let texts: Vec<String> = missing
            .iter()
            .map(|&i| documents[i].content.clone())
            .collect();
        let vectors = self.embedding.embed_documents(&texts).await;
        for (&i, vector) in missing.iter().zip(vectors) {
            documents[i].embedding = Some(vector);
        }
        documents
    }
}
