//! Error types for the Sagitta library.
//!
//! All fallible operations return [`Result`], an alias over [`SagittaError`].
//! The taxonomy mirrors how errors are handled at runtime: configuration
//! errors fail fast at construction time, while backend and reranking errors
//! are caught at a degradation boundary and logged instead of propagating to
//! the search caller.
//!
//! # Examples
//!
//! ```
//! use sagitta::error::{Result, SagittaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SagittaError::config("unknown reranker type 'cosmic'"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Sagitta operations.
#[derive(Error, Debug)]
pub enum SagittaError {
    /// Configuration errors (unknown reranker type, unsupported store type).
    /// These are raised at construction time and never silently ignored.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transient backend errors (vector database unreachable, LLM timeout).
    #[error("Backend error: {0}")]
    Backend(String),

    /// A model or LLM returned output the caller could not interpret.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Embedding generation errors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Lexical index errors.
    #[error("Index error: {0}")]
    Index(String),

    /// Reranker stage errors.
    #[error("Rerank error: {0}")]
    Rerank(String),

    /// A stage exceeded its time budget.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The engine has been closed.
    #[error("Engine closed: {0}")]
    Closed(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SagittaError.
pub type Result<T> = std::result::Result<T, SagittaError>;

impl SagittaError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SagittaError::Config(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        SagittaError::Backend(msg.into())
    }

    /// Create a new malformed-response error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        SagittaError::MalformedResponse(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        SagittaError::Embedding(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        SagittaError::Index(msg.into())
    }

    /// Create a new rerank error.
    pub fn rerank<S: Into<String>>(msg: S) -> Self {
        SagittaError::Rerank(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        SagittaError::Timeout(msg.into())
    }

    /// Create a new closed-engine error.
    pub fn closed<S: Into<String>>(msg: S) -> Self {
        SagittaError::Closed(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SagittaError::Other(msg.into())
    }

    /// True for error classes that are handled by degrading to a simpler
    /// mode rather than failing the request.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SagittaError::Backend(_)
                | SagittaError::MalformedResponse(_)
                | SagittaError::Timeout(_)
                | SagittaError::Embedding(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SagittaError::config("bad store type");
        assert_eq!(error.to_string(), "Configuration error: bad store type");

        let error = SagittaError::backend("qdrant unreachable");
        assert_eq!(error.to_string(), "Backend error: qdrant unreachable");

        let error = SagittaError::rerank("stage exploded");
        assert_eq!(error.to_string(), "Rerank error: stage exploded");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SagittaError::from(io_error);

        match error {
            SagittaError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(SagittaError::backend("down").is_transient());
        assert!(SagittaError::malformed("not json").is_transient());
        assert!(SagittaError::timeout("llm call").is_transient());
        assert!(!SagittaError::config("unknown type").is_transient());
        assert!(!SagittaError::closed("engine").is_transient());
    }
}
