//! TTL cache for reranker stages.
//!
//! Keyed by a hash of the query and the ordered candidate ids: a hit means
//! the same candidates arrived in the same order for the same query, so the
//! stage's previous output is still valid and recomputation is skipped
//! entirely.

use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use ahash::{AHashMap, AHasher};
use parking_lot::Mutex;

use crate::document::SearchResult;

struct CacheEntry {
    results: Vec<SearchResult>,
    inserted_at: Instant,
}

/// A time-bounded cache of stage outputs.
pub struct RerankCache {
    ttl: Duration,
    entries: Mutex<AHashMap<u64, CacheEntry>>,
}

impl RerankCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    fn key(query: &str, results: &[SearchResult]) -> u64 {
        let mut hasher = AHasher::default();
        query.hash(&mut hasher);
        for result in results {
            result.document.id.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Look up the cached output for this query and candidate ordering.
    pub fn get(&self, query: &str, results: &[SearchResult]) -> Option<Vec<SearchResult>> {
        let key = Self::key(query, results);
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.results.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a stage output.
    pub fn put(&self, query: &str, input: &[SearchResult], output: Vec<SearchResult>) {
        let key = Self::key(query, input);
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                results: output,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
