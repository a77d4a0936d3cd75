//! Error types for medrag
//!
//! Build-time failures propagate to the driver and abort the process;
//! query-time failures are caught at the query loop boundary.

use thiserror::Error;

/// Failure of a single call to the embedding service
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Transport failure: connection refused, timeout, broken body
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response decoded but has no usable `embedding` field
    #[error("embedding response missing field `{0}`")]
    MissingField(&'static str),

    /// Service returned a zero-length vector
    #[error("embedding service returned an empty vector")]
    Empty,

    /// Vector length differs from earlier embeddings in the same build
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Main error type for medrag
#[derive(Error, Debug)]
pub enum RagError {
    /// Source text yielded no records
    #[error("no knowledge records found in source text")]
    ExtractionEmpty,

    /// Embedding service failure
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Generation service failure
    #[error("generation failed: {0}")]
    Generation(String),

    /// Snapshot unreadable or schema-mismatched
    #[error("malformed knowledge base snapshot: {0}")]
    MalformedSnapshot(String),

    /// Query session state machine violation
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: String, to: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for medrag operations
pub type Result<T> = std::result::Result<T, RagError>;
