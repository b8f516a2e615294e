//! In-memory vector backend.
//!
//! Reference implementation of the driver contract: a brute-force cosine
//! scan over a map of embedded documents. Suitable for tests, small corpora,
//! and as the downgrade target when a configured remote backend cannot be
//! constructed.

use std::collections::HashMap;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::document::{Document, SOURCE_VECTOR, SearchResult};
use crate::error::{Result, SagittaError};
use crate::vector::backend::{VectorBackend, VectorCollectionStats};
use crate::vector::cosine_similarity;

#[derive(Debug, Default)]
struct Collection {
    name: String,
    dimension: usize,
    /// Insertion order, for deterministic tie-breaking.
    order: Vec<String>,
    documents: AHashMap<String, Document>,
}

/// Brute-force in-memory vector store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collection: RwLock<Option<Collection>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collection<T>(&self, f: impl FnOnce(&Collection) -> T) -> Result<T> {
        let guard = self.collection.read();
        let collection = guard
            .as_ref()
            .ok_or_else(|| SagittaError::backend("memory backend has no collection"))?;
        Ok(f(collection))
    }

    fn matches_filter(document: &Document, filter: Option<&HashMap<String, Value>>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        filter
            .iter()
            .all(|(key, expected)| document.metadata.get(key) == Some(expected))
    }
}

#[async_trait]
impl VectorBackend for MemoryBackend {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn create_collection(&self, name: &str, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(SagittaError::config("collection dimension must be non-zero"));
        }
        let mut guard = self.collection.write();
        match guard.as_ref() {
            Some(existing) if existing.name == name && existing.dimension == dimension => Ok(()),
            Some(existing) => Err(SagittaError::backend(format!(
                "collection '{}' already exists with dimension {}",
                existing.name, existing.dimension
            ))),
            None => {
                *guard = Some(Collection {
                    name: name.to_string(),
                    dimension,
                    order: Vec::new(),
                    documents: AHashMap::new(),
                });
                Ok(())
            }
        }
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        let mut guard = self.collection.write();
        let collection = guard
            .as_mut()
            .ok_or_else(|| SagittaError::backend("memory backend has no collection"))?;

        for doc in documents {
            let Some(embedding) = doc.embedding.as_ref() else {
                return Err(SagittaError::backend(format!(
                    "document '{}' has no embedding",
                    doc.id
                )));
            };
            if embedding.len() != collection.dimension {
                return Err(SagittaError::backend(format!(
                    "document '{}' embedding dimension {} does not match collection dimension {}",
                    doc.id,
                    embedding.len(),
                    collection.dimension
                )));
            }
            if collection.documents.insert(doc.id.clone(), doc.clone()).is_none() {
                collection.order.push(doc.id.clone());
            }
        }
        Ok(())
    }

    async fn search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<SearchResult>> {
        self.with_collection(|collection| {
            let mut scored: Vec<(usize, SearchResult)> = Vec::new();
            for (position, id) in collection.order.iter().enumerate() {
                let Some(doc) = collection.documents.get(id) else {
                    continue;
                };
                if !Self::matches_filter(doc, filter) {
                    continue;
                }
                let similarity = doc
                    .embedding
                    .as_deref()
                    .map(|embedding| cosine_similarity(vector, embedding))
                    .unwrap_or(0.0);
                scored.push((
                    position,
                    SearchResult::new(doc.clone(), similarity).with_source(SOURCE_VECTOR),
                ));
            }

            scored.sort_by(|a, b| {
                b.1.score
                    .partial_cmp(&a.1.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            scored.truncate(k);
            scored.into_iter().map(|(_, result)| result).collect()
        })
    }

    async fn delete_documents(&self, ids: &[String]) -> Result<usize> {
        let mut guard = self.collection.write();
        let collection = guard
            .as_mut()
            .ok_or_else(|| SagittaError::backend("memory backend has no collection"))?;

        let mut removed = 0;
        for id in ids {
            if collection.documents.remove(id).is_some() {
                removed += 1;
            }
        }
        collection.order.retain(|id| collection.documents.contains_key(id));
        Ok(removed)
    }

    async fn update_document(&self, document: &Document) -> Result<()> {
        self.add_documents(std::slice::from_ref(document)).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        self.with_collection(|collection| collection.documents.get(id).cloned())
    }

    async fn collection_stats(&self) -> Result<VectorCollectionStats> {
        self.with_collection(|collection| VectorCollectionStats {
            name: collection.name.clone(),
            vector_count: collection.documents.len(),
            dimension: collection.dimension,
            extra: HashMap::new(),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "memory"
    }
}
