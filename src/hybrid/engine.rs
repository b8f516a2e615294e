//! The hybrid search orchestrator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use futures::join;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::document::{Document, SOURCE_BM25, SOURCE_VECTOR, SearchResult};
use crate::embedding::{EmbeddingProvider, HashingEmbedder};
use crate::error::{Result, SagittaError};
use crate::fusion::{WeightedMerger, rrf_fuse};
use crate::hybrid::config::{HybridSearchConfig, StoreType};
use crate::hybrid::stats::HybridSearchStats;
use crate::lexical::{Bm25Config, Bm25Index};
use crate::llm::LlmClient;
use crate::rerank::{CrossEncoder, RerankContext, RerankerDeps, RerankerRegistry};
use crate::vector::{MemoryBackend, VectorBackend, VectorStore};

/// Lifecycle state of the engine.
///
/// `Degraded` means the vector store failed to initialize; the engine serves
/// lexical-only results for the rest of its life and is not retried
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, not yet initialized.
    Uninitialized,
    /// Initialization in progress.
    Initializing,
    /// Both retrieval paths available.
    Ready,
    /// Lexical-only fallback mode.
    Degraded,
    /// Closed; operations return empty results.
    Closed,
}

impl EngineState {
    /// Lowercase name, as reported in stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
            EngineState::Degraded => "degraded",
            EngineState::Closed => "closed",
        }
    }
}

/// A BM25 index together with the corpus snapshot it was built from.
///
/// Index positions refer into `documents`; swapping the pair atomically
/// keeps concurrent readers consistent during a rebuild.
struct LexicalIndex {
    index: Bm25Index,
    documents: Vec<Document>,
}

impl LexicalIndex {
    fn empty(config: Bm25Config) -> Self {
        Self {
            index: Bm25Index::empty(config),
            documents: Vec::new(),
        }
    }

    fn build(documents: Vec<Document>, config: Bm25Config) -> Self {
        let index = Bm25Index::build(&documents, config);
        Self { index, documents }
    }
}

/// Orchestrates lexical search, vector search, fusion, and reranking.
///
/// Index mutation assumes a single logical writer at a time (concurrent
/// writers are serialized internally); searches may run concurrently with a
/// rebuild and observe either the old or the new index.
pub struct HybridEngine {
    config: HybridSearchConfig,
    embedding: EmbeddingProvider,
    injected_backend: Option<Arc<dyn VectorBackend>>,
    llm: Option<Arc<dyn LlmClient>>,
    cross_encoder: Option<Arc<dyn CrossEncoder>>,
    custom_registry: Option<Arc<RerankerRegistry>>,
    state: RwLock<EngineState>,
    lexical: RwLock<Arc<LexicalIndex>>,
    ids: RwLock<AHashSet<String>>,
    writer: Mutex<()>,
    vector_store: RwLock<Option<Arc<VectorStore>>>,
    registry: RwLock<Option<Arc<RerankerRegistry>>>,
    last_indexed_at: RwLock<Option<DateTime<Utc>>>,
}

impl HybridEngine {
    /// Create an engine with a default feature-hashing embedder.
    ///
    /// Collaborators (LLM client, cross-encoder, a concrete vector backend,
    /// a custom registry) are wired with the `with_*` builders before
    /// [`initialize`](Self::initialize).
    pub fn new(config: HybridSearchConfig) -> Result<Self> {
        let embedder = HashingEmbedder::new(config.embedding_dimension)?;
        Ok(Self::with_embedding_provider(
            config,
            EmbeddingProvider::Query(Arc::new(embedder)),
        ))
    }

    /// Create an engine with an injected embedding function.
    pub fn with_embedding_provider(config: HybridSearchConfig, embedding: EmbeddingProvider) -> Self {
        let bm25_config = config.bm25.clone();
        Self {
            config,
            embedding,
            injected_backend: None,
            llm: None,
            cross_encoder: None,
            custom_registry: None,
            state: RwLock::new(EngineState::Uninitialized),
            lexical: RwLock::new(Arc::new(LexicalIndex::empty(bm25_config))),
            ids: RwLock::new(AHashSet::new()),
            writer: Mutex::new(()),
            vector_store: RwLock::new(None),
            registry: RwLock::new(None),
            last_indexed_at: RwLock::new(None),
        }
    }

    /// Wire an LLM client for LLM-judge rerankers.
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Wire a cross-encoder for the semantic reranker.
    pub fn with_cross_encoder(mut self, cross_encoder: Arc<dyn CrossEncoder>) -> Self {
        self.cross_encoder = Some(cross_encoder);
        self
    }

    /// Wire a concrete vector database driver.
    pub fn with_backend(mut self, backend: Arc<dyn VectorBackend>) -> Self {
        self.injected_backend = Some(backend);
        self
    }

    /// Replace the default reranker registry.
    pub fn with_registry(mut self, registry: RerankerRegistry) -> Self {
        self.custom_registry = Some(Arc::new(registry));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    /// Bring the engine up.
    ///
    /// Never fails because of a missing vector backend: a backend that
    /// cannot be constructed or initialized downgrades the engine to
    /// lexical-only (state [`EngineState::Degraded`], logged once).
    /// Reranker-set construction failure is likewise non-fatal; the engine
    /// then fuses with RRF. Errors only on an already-closed engine.
    pub async fn initialize(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            match *state {
                EngineState::Closed => {
                    return Err(SagittaError::closed("cannot initialize a closed engine"));
                }
                EngineState::Uninitialized => *state = EngineState::Initializing,
                // Already initialized (or mid-initialization elsewhere).
                _ => return Ok(()),
            }
        }

        // Fresh lexical index.
        *self.lexical.write() = Arc::new(LexicalIndex::empty(self.config.bm25.clone()));
        self.ids.write().clear();

        let backend = self.resolve_backend();
        let store = VectorStore::new(
            backend,
            self.embedding.clone(),
            self.config.collection.clone(),
        );

        match store.initialize().await {
            Ok(()) => {
                info!(
                    backend = store.backend_name(),
                    collection = %self.config.collection,
                    "vector store initialized"
                );
                *self.vector_store.write() = Some(Arc::new(store));
                *self.state.write() = EngineState::Ready;
            }
            Err(e) => {
                // Logged once; the engine stays lexical-only for its lifetime.
                warn!(
                    backend = store.backend_name(),
                    error = %e,
                    "vector store initialization failed, continuing lexical-only"
                );
                *self.vector_store.write() = None;
                *self.state.write() = EngineState::Degraded;
            }
        }

        self.initialize_rerankers();
        Ok(())
    }

    fn resolve_backend(&self) -> Arc<dyn VectorBackend> {
        if let Some(backend) = &self.injected_backend {
            return backend.clone();
        }
        match self.config.store_type {
            StoreType::Memory => Arc::new(MemoryBackend::new()),
            other => {
                warn!(
                    store_type = other.as_str(),
                    "no driver wired for configured store type, downgrading to memory"
                );
                Arc::new(MemoryBackend::new())
            }
        }
    }

    fn initialize_rerankers(&self) {
        let registry = match &self.custom_registry {
            Some(registry) => registry.clone(),
            None => {
                let deps = RerankerDeps {
                    embedding: self.embedding.clone(),
                    llm: self.llm.clone(),
                    cross_encoder: self.cross_encoder.clone(),
                };
                match RerankerRegistry::with_default_pipelines(&deps) {
                    Ok(registry) => Arc::new(registry),
                    Err(e) => {
                        warn!(error = %e, "reranker initialization failed, falling back to RRF");
                        return;
                    }
                }
            }
        };

        if registry.pipeline(&self.config.reranker_pipeline).is_none() {
            warn!(
                pipeline = %self.config.reranker_pipeline,
                "configured reranker pipeline is not defined, falling back to RRF"
            );
            return;
        }
        *self.registry.write() = Some(registry);
    }

    /// `Ok(true)` to proceed, `Ok(false)` when closed (caller returns the
    /// empty answer), `Err` before initialization.
    fn lifecycle_gate(&self) -> Result<bool> {
        match *self.state.read() {
            EngineState::Ready | EngineState::Degraded => Ok(true),
            EngineState::Closed => Ok(false),
            EngineState::Uninitialized | EngineState::Initializing => Err(SagittaError::config(
                "engine is not initialized; call initialize() first",
            )),
        }
    }

    /// Add a batch of documents to both indexes.
    ///
    /// The lexical index is rebuilt and swapped first; the batch is then
    /// forwarded to the vector store. A vector-side failure is logged and
    /// reported as `Ok(false)` without rolling back the lexical addition,
    /// so the two indexes may diverge until the next successful write.
    /// Duplicate ids fail fast with a configuration error.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<bool> {
        if !self.lifecycle_gate()? {
            return Ok(false);
        }
        if documents.is_empty() {
            return Ok(true);
        }

        {
            let _writer = self.writer.lock();

            let mut ids = self.ids.write();
            let mut batch_ids = AHashSet::new();
            for doc in &documents {
                if ids.contains(&doc.id) || !batch_ids.insert(doc.id.clone()) {
                    return Err(SagittaError::config(format!(
                        "duplicate document id '{}'",
                        doc.id
                    )));
                }
            }
            ids.extend(batch_ids);
            drop(ids);

            let mut corpus = self.lexical.read().documents.clone();
            corpus.extend(documents.iter().cloned());
            let rebuilt = LexicalIndex::build(corpus, self.config.bm25.clone());
            debug!(
                total = rebuilt.index.len(),
                added = documents.len(),
                "lexical index rebuilt"
            );
            *self.lexical.write() = Arc::new(rebuilt);
        }
        *self.last_indexed_at.write() = Some(Utc::now());

        let store = self.vector_store.read().clone();
        let vector_ok = match store {
            Some(store) => store.add_documents(&documents).await,
            None => true,
        };
        Ok(vector_ok)
    }

    /// Delete documents by id from both indexes.
    ///
    /// Same partial-failure tolerance as [`add_documents`](Self::add_documents).
    pub async fn delete_documents(&self, ids: &[String]) -> Result<bool> {
        if !self.lifecycle_gate()? {
            return Ok(false);
        }
        if ids.is_empty() {
            return Ok(true);
        }

        let removal: AHashSet<&str> = ids.iter().map(String::as_str).collect();
        {
            let _writer = self.writer.lock();

            let mut resident = self.ids.write();
            resident.retain(|id| !removal.contains(id.as_str()));
            drop(resident);

            let mut corpus = self.lexical.read().documents.clone();
            corpus.retain(|doc| !removal.contains(doc.id.as_str()));
            let rebuilt = LexicalIndex::build(corpus, self.config.bm25.clone());
            debug!(total = rebuilt.index.len(), "lexical index rebuilt after delete");
            *self.lexical.write() = Arc::new(rebuilt);
        }
        *self.last_indexed_at.write() = Some(Utc::now());

        let store = self.vector_store.read().clone();
        let vector_ok = match store {
            Some(store) => store.delete_documents(ids).await,
            None => true,
        };
        Ok(vector_ok)
    }

    /// Execute a search, degrading in layers.
    ///
    /// Hybrid mode runs the lexical and vector sub-searches concurrently,
    /// merges candidates by id (max score wins), then applies the configured
    /// reranker pipeline, or RRF fusion over the two per-source rankings
    /// when reranking is disabled or unavailable. Every failure inside the
    /// hybrid path falls back to lexical-only; the caller never sees an
    /// error while the lexical index holds data.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<SearchResult>> {
        if !self.lifecycle_gate()? {
            return Ok(Vec::new());
        }
        if k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let store = self.vector_store.read().clone();
        let store = match store {
            Some(store) if self.config.enable_hybrid => store,
            _ => return Ok(self.lexical_candidates(query, k, filter)),
        };

        match self.hybrid_search(&store, query, k, filter).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(query, error = %e, "hybrid search failed, falling back to lexical-only");
                Ok(self.lexical_candidates(query, k, filter))
            }
        }
    }

    async fn hybrid_search(
        &self,
        store: &Arc<VectorStore>,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<SearchResult>> {
        let fetch = self.config.rerank_top_k.max(k);
        let (lexical, vector) = join!(
            self.lexical_candidates_async(query, fetch, filter),
            store.search(query, fetch, filter)
        );

        let registry = if self.config.enable_reranking {
            self.registry.read().clone()
        } else {
            None
        };

        let reranked = if let Some(registry) = registry {
            let merged = Self::merge_candidates(&lexical, &vector);
            let context = RerankContext {
                query: query.to_string(),
                filter: filter.cloned(),
            };
            let timeout = Duration::from_millis(self.config.stage_timeout_ms);
            match registry
                .run_pipeline(&self.config.reranker_pipeline, query, merged, &context, timeout)
                .await
            {
                Ok(reranked) => Some(reranked),
                Err(e) => {
                    warn!(
                        query,
                        pipeline = %self.config.reranker_pipeline,
                        error = %e,
                        "reranker pipeline unavailable, fusing with RRF"
                    );
                    None
                }
            }
        } else {
            None
        };

        // RRF fuses the original per-source rankings, not the merged set.
        let mut results = match reranked {
            Some(results) => results,
            None => rrf_fuse(
                vec![lexical, vector],
                self.config.rrf_k,
                self.config.final_top_k.max(k),
            ),
        };
        results.truncate(k);
        Ok(results)
    }

    /// Legacy weighted-combination search.
    ///
    /// Normalizes each source's scores and blends them with the configured
    /// weights; this is the only path where `lexical_weight` and
    /// `vector_weight` matter.
    pub async fn search_weighted(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Result<Vec<SearchResult>> {
        if !self.lifecycle_gate()? {
            return Ok(Vec::new());
        }

        let store = self.vector_store.read().clone();
        let Some(store) = store else {
            return Ok(self.lexical_candidates(query, k, filter));
        };

        let fetch = self.config.rerank_top_k.max(k);
        let (lexical, vector) = join!(
            self.lexical_candidates_async(query, fetch, filter),
            store.search(query, fetch, filter)
        );

        let merger = WeightedMerger::new(
            self.config.lexical_weight,
            self.config.vector_weight,
            self.config.normalization,
        );
        Ok(merger.merge(lexical, vector, k))
    }

    async fn lexical_candidates_async(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Vec<SearchResult> {
        self.lexical_candidates(query, k, filter)
    }

    fn lexical_candidates(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, Value>>,
    ) -> Vec<SearchResult> {
        let snapshot = self.lexical.read().clone();
        // Overfetch when a filter will drop candidates after scoring.
        let fetch = if filter.is_some() { k * 4 } else { k };

        let mut results = Vec::new();
        for (position, score) in snapshot.index.search(query, fetch) {
            if results.len() == k {
                break;
            }
            if score < self.config.min_score {
                continue;
            }
            let Some(doc) = snapshot.documents.get(position) else {
                continue;
            };
            if !matches_filter(doc, filter) {
                continue;
            }
            let mut result = SearchResult::new(doc.clone(), score).with_source(SOURCE_BM25);
            result.annotate("bm25_score", score as f64);
            results.push(result);
        }
        results
    }

    /// Dedup by document id, keeping the maximum score seen across the two
    /// lists and annotating per-source scores on the survivor.
    fn merge_candidates(lexical: &[SearchResult], vector: &[SearchResult]) -> Vec<SearchResult> {
        let mut merged: Vec<SearchResult> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for result in lexical {
            positions.insert(result.document.id.as_str(), merged.len());
            merged.push(result.clone());
        }
        for result in vector {
            match positions.get(result.document.id.as_str()) {
                Some(&position) => {
                    let existing = &mut merged[position];
                    existing.annotate("vector_score", result.score as f64);
                    if result.score > existing.score {
                        existing.score = result.score;
                        existing
                            .metadata
                            .insert(crate::document::SOURCE_KEY.into(), SOURCE_VECTOR.into());
                    }
                }
                None => merged.push(result.clone()),
            }
        }
        merged
    }

    /// Point-in-time statistics snapshot.
    pub async fn stats(&self) -> HybridSearchStats {
        let snapshot = self.lexical.read().clone();
        let state = self.state();
        let store = self.vector_store.read().clone();

        let (available, vector_count) = match &store {
            Some(store) => (
                store.is_available().await,
                store.stats().await.map(|s| s.vector_count),
            ),
            None => (false, None),
        };

        HybridSearchStats {
            total_documents: snapshot.index.len(),
            vocabulary_size: snapshot.index.vocabulary_size(),
            avg_doc_length: snapshot.index.avg_doc_length(),
            state: state.as_str().to_string(),
            store_type: self.config.store_type.as_str().to_string(),
            vector_store_available: available,
            vector_count,
            reranking_enabled: self.config.enable_reranking,
            reranking_available: self.registry.read().is_some(),
            last_indexed_at: *self.last_indexed_at.read(),
        }
    }

    /// Statistics as the string-keyed map exposed by the query API.
    pub async fn get_collection_stats(&self) -> HashMap<String, Value> {
        self.stats().await.into_map()
    }

    /// Remove every document from both indexes.
    pub async fn clear(&self) -> Result<()> {
        if !self.lifecycle_gate()? {
            return Ok(());
        }

        let ids: Vec<String> = {
            let _writer = self.writer.lock();
            let ids = self.ids.write().drain().collect();
            *self.lexical.write() = Arc::new(LexicalIndex::empty(self.config.bm25.clone()));
            ids
        };

        let store = self.vector_store.read().clone();
        if let Some(store) = store
            && !ids.is_empty()
        {
            store.delete_documents(&ids).await;
        }
        Ok(())
    }

    /// Shut the engine down. Subsequent searches return empty lists and
    /// mutations report `false`; the transition is irreversible.
    pub fn close(&self) {
        *self.state.write() = EngineState::Closed;
        *self.vector_store.write() = None;
        *self.registry.write() = None;
        info!("hybrid engine closed");
    }
}

fn matches_filter(document: &Document, filter: Option<&HashMap<String, Value>>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    filter
        .iter()
        .all(|(key, expected)| document.metadata.get(key) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_corpus() -> Vec<Document> {
        vec![
            Document::new("d1", "GET /users returns list").with_meta("topic", "users"),
            Document::new("d2", "POST /users creates user").with_meta("topic", "users"),
            Document::new("d3", "rate limiting applies per minute").with_meta("topic", "limits"),
        ]
    }

    async fn ready_engine(config: HybridSearchConfig) -> HybridEngine {
        let engine = HybridEngine::new(config).unwrap();
        engine.initialize().await.unwrap();
        engine
    }

    fn rrf_config() -> HybridSearchConfig {
        HybridSearchConfig {
            enable_reranking: false,
            embedding_dimension: 64,
            ..HybridSearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_reaches_ready() {
        let engine = ready_engine(rrf_config()).await;
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn test_search_before_initialize_fails_fast() {
        let engine = HybridEngine::new(rrf_config()).unwrap();
        assert!(engine.search("q", 3, None).await.is_err());
        assert!(engine.add_documents(vec![Document::new("d", "c")]).await.is_err());
    }

    #[tokio::test]
    async fn test_add_and_search_hybrid() {
        let engine = ready_engine(rrf_config()).await;
        assert!(engine.add_documents(api_corpus()).await.unwrap());

        let results = engine.search("how to list users", 2, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "d1");
    }

    #[tokio::test]
    async fn test_duplicate_id_fails_fast() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();

        let err = engine
            .add_documents(vec![Document::new("d1", "again")])
            .await
            .unwrap_err();
        assert!(matches!(err, SagittaError::Config(_)));

        let batch_err = engine
            .add_documents(vec![Document::new("x", "a"), Document::new("x", "b")])
            .await
            .unwrap_err();
        assert!(matches!(batch_err, SagittaError::Config(_)));
    }

    #[tokio::test]
    async fn test_delete_rebuilds_lexical() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();
        assert!(engine.delete_documents(&["d1".to_string()]).await.unwrap());

        let results = engine.search("list users", 5, None).await.unwrap();
        assert!(results.iter().all(|r| r.document.id != "d1"));

        let stats = engine.stats().await;
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.vector_count, Some(2));
    }

    #[tokio::test]
    async fn test_metadata_filter_applies() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();

        let filter = HashMap::from([("topic".to_string(), Value::from("limits"))]);
        let results = engine.search("rate limiting", 5, Some(&filter)).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.document.id == "d3"));
    }

    #[tokio::test]
    async fn test_hybrid_disabled_is_lexical_only() {
        let config = HybridSearchConfig {
            enable_hybrid: false,
            ..rrf_config()
        };
        let engine = ready_engine(config).await;
        engine.add_documents(api_corpus()).await.unwrap();

        let results = engine.search("list users", 5, None).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.source() == Some(SOURCE_BM25)));
    }

    #[tokio::test]
    async fn test_close_returns_empty_without_error() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();
        engine.close();

        assert_eq!(engine.state(), EngineState::Closed);
        assert!(engine.search("users", 5, None).await.unwrap().is_empty());
        assert!(!engine.add_documents(vec![Document::new("x", "y")]).await.unwrap());
        assert!(engine.initialize().await.is_err());
    }

    #[tokio::test]
    async fn test_clear_empties_both_indexes() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();
        engine.clear().await.unwrap();

        let stats = engine.stats().await;
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.vector_count, Some(0));
        assert!(engine.search("users", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_keeps_max_score_and_one_copy() {
        let lexical = vec![
            SearchResult::new(Document::new("shared", "c"), 0.4).with_source(SOURCE_BM25),
            SearchResult::new(Document::new("lex", "c"), 0.3).with_source(SOURCE_BM25),
        ];
        let vector = vec![
            SearchResult::new(Document::new("shared", "c"), 0.9).with_source(SOURCE_VECTOR),
        ];

        let merged = HybridEngine::merge_candidates(&lexical, &vector);
        assert_eq!(merged.len(), 2);

        let shared = merged.iter().find(|r| r.document.id == "shared").unwrap();
        assert_eq!(shared.score, 0.9);
        assert_eq!(shared.source(), Some(SOURCE_VECTOR));
        assert!(shared.metadata.contains_key("bm25_score"));
        assert!(shared.metadata.contains_key("vector_score"));
    }

    #[tokio::test]
    async fn test_stats_reflect_corpus() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();

        let map = engine.get_collection_stats().await;
        assert_eq!(map.get("total_documents").unwrap(), 3);
        assert_eq!(map.get("vector_store_available").unwrap(), true);
        assert_eq!(map.get("state").unwrap(), "ready");
        assert!(map.contains_key("last_indexed_at"));
    }

    #[tokio::test]
    async fn test_weighted_search_path() {
        let engine = ready_engine(rrf_config()).await;
        engine.add_documents(api_corpus()).await.unwrap();

        let results = engine.search_weighted("list users", 2, None).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
    }
}
