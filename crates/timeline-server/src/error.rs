//! Error types for the timeline server.

use thiserror::Error;
use timeline_core::CoreError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing or unusable caller identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the admin capability
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Graph data store error
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Blob store error
    #[error("Blob store error: {0}")]
    BlobStoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ServerError::ValidationError(msg),
            CoreError::Unauthorized(msg) => ServerError::Forbidden(msg),
            // Foreign-key violations surface as conflicts with concurrent edits.
            CoreError::Referential(msg) => ServerError::Conflict(msg),
            CoreError::NotFound(what) => ServerError::NotFound(what),
            CoreError::Conflict(msg) => ServerError::Conflict(msg),
            CoreError::StateStore(msg) => ServerError::StateStoreError(msg),
            CoreError::BlobStore(msg) => ServerError::BlobStoreError(msg),
            CoreError::Serialization(msg) => ServerError::ValidationError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_onto_server_errors() {
        let err: ServerError = CoreError::Unauthorized("add node".into()).into();
        assert!(matches!(err, ServerError::Forbidden(_)));

        let err: ServerError = CoreError::Referential("node gone".into()).into();
        assert!(matches!(err, ServerError::Conflict(_)));

        let err: ServerError = CoreError::NotFound("node x".into()).into();
        assert_eq!(err.to_string(), "node x not found");
    }
}
