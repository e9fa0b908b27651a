//! Error types for the Quarrel library.
//!
//! All errors are represented by the [`QuarrelError`] enum. Transient
//! backend failures use the dedicated [`QuarrelError::BackendUnavailable`]
//! variant so retry code can classify errors without string matching;
//! everything else is fatal for the unit of work that raised it.

use std::io;

use thiserror::Error;

/// The main error type for Quarrel operations.
#[derive(Error, Debug)]
pub enum QuarrelError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Query-related errors (malformed trees, invalid operators, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Structural errors: a node shape the current operation cannot accept.
    /// These abort the current tree or candidate and are never retried.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Fatal backend errors (query rejected, untranslatable, etc.)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Transient backend errors (connectivity, timeout). Retryable.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Cache-related errors. A cache miss is not an error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Transformation-related errors
    #[error("Transform error: {0}")]
    Transform(String),

    /// Selector-related errors
    #[error("Selector error: {0}")]
    Selector(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Thread join errors
    #[error("Thread join error: {0}")]
    ThreadJoinError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with QuarrelError.
pub type Result<T> = std::result::Result<T, QuarrelError>;

impl QuarrelError {
    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Query(msg.into())
    }

    /// Create a new structural error.
    pub fn structural<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Structural(msg.into())
    }

    /// Create a new fatal backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Backend(msg.into())
    }

    /// Create a new transient backend error.
    pub fn backend_unavailable<S: Into<String>>(msg: S) -> Self {
        QuarrelError::BackendUnavailable(msg.into())
    }

    /// Create a new cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Cache(msg.into())
    }

    /// Create a new transform error.
    pub fn transform<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Transform(msg.into())
    }

    /// Create a new selector error.
    pub fn selector<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Selector(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QuarrelError::Other(msg.into())
    }

    /// Whether this error is transient and safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, QuarrelError::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = QuarrelError::query("bad operator");
        assert_eq!(error.to_string(), "Query error: bad operator");

        let error = QuarrelError::structural("empty boolean node");
        assert_eq!(error.to_string(), "Structural error: empty boolean node");

        let error = QuarrelError::backend_unavailable("connection refused");
        assert_eq!(error.to_string(), "Backend unavailable: connection refused");
    }

    #[test]
    fn test_transient_classification() {
        assert!(QuarrelError::backend_unavailable("timeout").is_transient());
        assert!(!QuarrelError::backend("rejected").is_transient());
        assert!(!QuarrelError::structural("bad shape").is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = QuarrelError::from(io_error);

        match error {
            QuarrelError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
