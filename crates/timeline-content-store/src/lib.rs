//! Timeline Content Store
//!
//! Provides abstractions and implementations for blob storage backing the
//! document sub-resources of timeline nodes. The BlobStorage trait defines a
//! contract for storing/retrieving binary payloads addressed by path; the
//! metadata row describing a document lives in the graph data store, not here.
//!
//! Paths are partitioned by node id (`nodes/<node_id>/...`) so concurrent
//! uploads to different nodes never collide; filenames are qualified with a
//! millisecond timestamp so repeated uploads of the same name to one node do
//! not overwrite each other.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during blob store operations
#[derive(Error, Debug)]
pub enum BlobStoreError {
    /// No blob stored at the given path
    #[error("Blob not found at path: {0}")]
    NotFound(String),

    /// Path failed validation (empty, absolute, or escaping the root)
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    /// Catch-all for backend-specific issues
    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),

    /// Filesystem error from the file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for BlobStorage operations
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Trait defining the contract for blob storage implementations
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug {
    /// Store bytes at the given path, overwriting any existing blob there
    async fn upload(&self, path: &str, bytes: &[u8]) -> BlobStoreResult<()>;

    /// Retrieve the bytes stored at the given path
    async fn download(&self, path: &str) -> BlobStoreResult<Vec<u8>>;

    /// Remove the blob at the given path; `NotFound` if nothing is stored there
    async fn remove(&self, path: &str) -> BlobStoreResult<()>;

    /// Check whether a blob exists at the given path
    async fn exists(&self, path: &str) -> BlobStoreResult<bool>;
}

/// Build the storage path for a document uploaded to a node.
///
/// The node id partitions the namespace and the millisecond timestamp
/// qualifies the filename against same-node collisions.
pub fn document_path(
    node_id: &str,
    filename: &str,
    timestamp_millis: i64,
) -> BlobStoreResult<String> {
    if node_id.is_empty() {
        return Err(BlobStoreError::InvalidPath("empty node id".to_string()));
    }
    let sanitized = sanitize_filename(filename)?;
    let path = format!("nodes/{}/{}_{}", node_id, timestamp_millis, sanitized);
    validate_path(&path)?;
    Ok(path)
}

/// Strip directory components from a client-supplied filename
fn sanitize_filename(filename: &str) -> BlobStoreResult<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(BlobStoreError::InvalidPath(format!(
            "unusable filename: {:?}",
            filename
        )));
    }
    Ok(base.to_string())
}

/// Validate a storage path before handing it to a backend
pub fn validate_path(path: &str) -> BlobStoreResult<()> {
    if path.is_empty() {
        return Err(BlobStoreError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with('/') {
        return Err(BlobStoreError::InvalidPath(format!(
            "absolute path not allowed: {}",
            path
        )));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(BlobStoreError::InvalidPath(format!(
            "path escapes storage root: {}",
            path
        )));
    }
    Ok(())
}

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_path_is_partitioned_by_node() {
        let a = document_path("node-a", "report.pdf", 1700000000000).unwrap();
        let b = document_path("node-b", "report.pdf", 1700000000000).unwrap();
        assert!(a.starts_with("nodes/node-a/"));
        assert!(b.starts_with("nodes/node-b/"));
        assert_ne!(a, b);
    }

    #[test]
    fn document_path_qualifies_same_node_uploads_by_timestamp() {
        let first = document_path("node-a", "report.pdf", 1).unwrap();
        let second = document_path("node-a", "report.pdf", 2).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn document_path_strips_directory_components() {
        let path = document_path("node-a", "../../etc/passwd", 42).unwrap();
        assert_eq!(path, "nodes/node-a/42_passwd");
    }

    #[test]
    fn validate_path_rejects_escapes() {
        assert!(validate_path("nodes/a/../../secret").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("").is_err());
        assert!(validate_path("nodes/a/1_report.pdf").is_ok());
    }
}
