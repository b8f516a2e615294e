//! Embedding generation contracts.
//!
//! The embedding function is injected by the application and may come in one
//! of three capability shapes: batch document embedding, single-query
//! embedding, or a raw callable. The shape is resolved once at configuration
//! time into the [`EmbeddingProvider`] sum type rather than re-detected per
//! call.
//!
//! Embedding never hard-fails the indexing or search path: on total failure
//! the provider logs a warning and yields the all-zero vector of the
//! configured dimensionality.

pub mod hashing;
pub mod provider;

pub use hashing::HashingEmbedder;
pub use provider::{BatchEmbedder, EmbeddingProvider, QueryEmbedder, RawEmbedFn};
