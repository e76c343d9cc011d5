//! In-memory implementation of BlobStorage
//!
//! Primarily intended for testing and development. All data is lost when the
//! instance is dropped.

use crate::{validate_path, BlobStorage, BlobStoreError, BlobStoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory blob store keyed by path
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    /// Create a new, empty in-memory blob store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> BlobStoreResult<()> {
        validate_path(path)?;
        let mut blobs = self.blobs.write().await;
        blobs.insert(path.to_string(), bytes.to_vec());
        tracing::debug!(path, size = bytes.len(), "stored blob in memory");
        Ok(())
    }

    async fn download(&self, path: &str) -> BlobStoreResult<Vec<u8>> {
        validate_path(path)?;
        let blobs = self.blobs.read().await;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(path.to_string()))
    }

    async fn remove(&self, path: &str) -> BlobStoreResult<()> {
        validate_path(path)?;
        let mut blobs = self.blobs.write().await;
        blobs
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> BlobStoreResult<bool> {
        validate_path(path)?;
        Ok(self.blobs.read().await.contains_key(path))
    }
}
