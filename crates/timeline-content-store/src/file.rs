//! File-backed implementation of BlobStorage
//!
//! Stores each blob as a file under a root directory, preserving the
//! node-partitioned path layout on disk.

use crate::{validate_path, BlobStorage, BlobStoreError, BlobStoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Blob store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub async fn new(root: impl Into<PathBuf>) -> BlobStoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory backing this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> BlobStoreResult<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }

    fn map_io(path: &str, err: std::io::Error) -> BlobStoreError {
        if err.kind() == ErrorKind::NotFound {
            BlobStoreError::NotFound(path.to_string())
        } else {
            BlobStoreError::Io(err)
        }
    }
}

#[async_trait]
impl BlobStorage for FileBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> BlobStoreResult<()> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "stored blob on disk");
        Ok(())
    }

    async fn download(&self, path: &str) -> BlobStoreResult<Vec<u8>> {
        let full = self.full_path(path)?;
        tokio::fs::read(&full)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn remove(&self, path: &str) -> BlobStoreResult<()> {
        let full = self.full_path(path)?;
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| Self::map_io(path, e))
    }

    async fn exists(&self, path: &str) -> BlobStoreResult<bool> {
        let full = self.full_path(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        store
            .upload("nodes/n1/1_notes.txt", b"contents")
            .await
            .unwrap();
        assert!(store.exists("nodes/n1/1_notes.txt").await.unwrap());
        assert_eq!(
            store.download("nodes/n1/1_notes.txt").await.unwrap(),
            b"contents"
        );

        store.remove("nodes/n1/1_notes.txt").await.unwrap();
        assert!(!store.exists("nodes/n1/1_notes.txt").await.unwrap());
    }

    #[tokio::test]
    async fn missing_file_maps_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        let result = store.download("nodes/n1/1_gone.txt").await;
        assert!(matches!(result, Err(BlobStoreError::NotFound(_))));

        let result = store.remove("nodes/n1/1_gone.txt").await;
        assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn traversal_paths_never_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();
        assert!(store.upload("../outside.txt", b"x").await.is_err());
    }
}
