//! Lexical (keyword) indexing and BM25 ranking.
//!
//! The lexical path keeps an in-memory inverted index over the document
//! collection and ranks documents against a free-text query with Okapi BM25.
//! The index is rebuilt wholesale on every mutation; collections are
//! re-indexed infrequently relative to query volume, so the rebuild cost is
//! acceptable and keeps the index structure trivially consistent.

pub mod bm25;
pub mod tokenizer;

pub use bm25::{Bm25Config, Bm25Index};
pub use tokenizer::tokenize;
