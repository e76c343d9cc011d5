use thiserror::Error;
use timeline_content_store::BlobStoreError;

/// Core error type for the timeline graph system
///
/// Variants follow the error taxonomy of the product: validation errors are
/// caught before any store call, authorization errors reject admin-gated
/// mutations, referential errors surface foreign-key violations detected by
/// the store, and store errors cover everything transient underneath.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required field is missing or a value is out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller lacks the admin capability for this mutation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A referenced row no longer exists (deleted concurrently)
    #[error("Referential error: {0}")]
    Referential(String),

    /// Entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Operation conflicts with current state (e.g. indication not pending)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Graph data store error
    #[error("State store error: {0}")]
    StateStore(String),

    /// Blob store error
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type used throughout the domain and application layers
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<BlobStoreError> for CoreError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotFound(path) => CoreError::NotFound(format!("Blob at {}", path)),
            BlobStoreError::InvalidPath(msg) => CoreError::Validation(msg),
            other => CoreError::BlobStore(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            CoreError::Validation("title is required".into()).to_string(),
            "Validation error: title is required"
        );
        assert_eq!(CoreError::NotFound("Node".into()).to_string(), "Node not found");
        assert_eq!(
            CoreError::Unauthorized("add node".into()).to_string(),
            "Unauthorized: add node"
        );
    }

    #[test]
    fn blob_not_found_maps_to_not_found() {
        let err: CoreError = BlobStoreError::NotFound("nodes/a/1_x".into()).into();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
