//! Error types for Lectern

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Lectern study assistant
///
/// Ingestion and generation failures are recovered locally by their callers;
/// embedding and index-build failures during an explicit build are hard
/// failures so a partial index is never silently used.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ingestion error for lecture '{lecture}': {reason}")]
    Ingestion { lecture: String, reason: String },

    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("embedding space mismatch: query has {actual} dimensions, store has {expected}")]
    EmbeddingSpaceMismatch { expected: usize, actual: usize },

    #[error("generation provider error: {0}")]
    GenerationProvider(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
