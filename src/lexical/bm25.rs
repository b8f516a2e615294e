//! In-memory BM25 inverted index.
//!
//! The index is immutable once built: mutation happens by building a fresh
//! index from the full corpus and swapping the reference. Concurrent readers
//! during a rebuild therefore observe either the old or the new index,
//! never a half-built one.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::lexical::tokenizer::tokenize;

/// BM25 tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term frequency saturation.
    pub k1: f32,
    /// Document length normalization.
    pub b: f32,
    /// Minimum token length accepted by the tokenizer.
    pub min_token_len: usize,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            min_token_len: 3,
        }
    }
}

/// An inverted index over a document collection with BM25 scoring.
#[derive(Debug)]
pub struct Bm25Index {
    /// Document ids, in insertion order. Search results refer to positions
    /// in this list.
    doc_ids: Vec<String>,
    /// Token count per document.
    doc_lengths: Vec<usize>,
    /// Average token count across the collection.
    avg_doc_length: f32,
    /// term -> document position -> term frequency.
    term_freq: AHashMap<String, AHashMap<usize, u32>>,
    /// term -> number of documents containing it.
    doc_freq: AHashMap<String, u32>,
    config: Bm25Config,
}

impl Bm25Index {
    /// Create an empty index.
    pub fn empty(config: Bm25Config) -> Self {
        Self {
            doc_ids: Vec::new(),
            doc_lengths: Vec::new(),
            avg_doc_length: 0.0,
            term_freq: AHashMap::new(),
            doc_freq: AHashMap::new(),
            config,
        }
    }

    /// Build an index over the full corpus.
    ///
    /// Cost is O(total tokens). Every call re-tokenizes every document; the
    /// caller replaces its previous index with the returned one.
    pub fn build(documents: &[Document], config: Bm25Config) -> Self {
        let mut index = Self::empty(config);

        for (position, doc) in documents.iter().enumerate() {
            let tokens = tokenize(&doc.content, index.config.min_token_len);
            index.doc_ids.push(doc.id.clone());
            index.doc_lengths.push(tokens.len());

            let mut seen_terms: AHashMap<&str, u32> = AHashMap::new();
            for token in &tokens {
                *seen_terms.entry(token.as_str()).or_insert(0) += 1;
            }

            for (term, tf) in seen_terms {
                index
                    .term_freq
                    .entry(term.to_string())
                    .or_default()
                    .insert(position, tf);
                *index.doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        let total_len: usize = index.doc_lengths.iter().sum();
        index.avg_doc_length = if index.doc_ids.is_empty() {
            0.0
        } else {
            total_len as f32 / index.doc_ids.len() as f32
        };

        index
    }

    /// Rank documents against a free-text query.
    ///
    /// Returns up to `k` `(document position, score)` pairs sorted by
    /// descending score. Documents sharing no term with the query are
    /// excluded rather than returned with score zero. Ties keep insertion
    /// order. An empty corpus or an empty/all-stop-word query yields an
    /// empty result.
    pub fn search(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        if self.doc_ids.is_empty() || k == 0 {
            return Vec::new();
        }

        let query_terms = tokenize(query, self.config.min_token_len);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let total_docs = self.doc_ids.len() as f32;
        let mut scores: AHashMap<usize, f32> = AHashMap::new();

        for term in &query_terms {
            let Some(postings) = self.term_freq.get(term) else {
                continue;
            };
            let df = *self.doc_freq.get(term).unwrap_or(&0) as f32;
            let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();

            for (&position, &tf) in postings {
                let tf = tf as f32;
                let doc_len = self.doc_lengths[position] as f32;
                let norm = self.config.k1
                    * (1.0 - self.config.b + self.config.b * doc_len / self.avg_doc_length);
                let contribution = idf * tf * (self.config.k1 + 1.0) / (tf + norm);
                *scores.entry(position).or_insert(0.0) += contribution;
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        // Deterministic ordering: descending score, insertion order on ties.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }

    /// The id of the document at `position`, if in range.
    pub fn doc_id(&self, position: usize) -> Option<&str> {
        self.doc_ids.get(position).map(String::as_str)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// True when no documents are indexed.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Average document length in tokens.
    pub fn avg_doc_length(&self) -> f32 {
        self.avg_doc_length
    }

    /// Number of distinct terms in the index.
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freq.len()
    }
}
