//! Named blobs holding a serialized index.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::IndexedDocument;
use crate::{RagError, Result};

/// Durable home of the index, keyed by blob name
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Fails with [`RagError::Storage`] when the blob is missing
    async fn read(&self, name: &str) -> Result<Vec<IndexedDocument>>;

    /// Replace the blob's contents in a single step
    async fn write(&self, name: &str, documents: &[IndexedDocument]) -> Result<()>;

    /// Deleting a missing blob is not an error
    async fn delete(&self, name: &str) -> Result<()>;

    /// Move `from` over `to`, replacing it
    async fn rename(&self, from: &str, to: &str) -> Result<()>;
}

/// One `<name>.json` file per blob inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    #[inline]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    pub fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", name))
    }
}

#[async_trait]
impl BlobStorage for JsonFileStorage {
    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.blob_path(name)).await?)
    }

    async fn read(&self, name: &str) -> Result<Vec<IndexedDocument>> {
        let path = self.blob_path(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RagError::Storage(format!(
                    "Index file not found: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let documents: Vec<IndexedDocument> = serde_json::from_slice(&bytes).map_err(|e| {
            RagError::Storage(format!("Corrupt index file {}: {}", path.display(), e))
        })?;
        debug!("Read {} documents from {}", documents.len(), path.display());
        Ok(documents)
    }

    async fn write(&self, name: &str, documents: &[IndexedDocument]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            RagError::Storage(format!(
                "Failed to create data directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let payload = serde_json::to_vec(documents)?;
        let temp = self.temp_path(name);
        tokio::fs::write(&temp, payload).await?;
        tokio::fs::rename(&temp, self.blob_path(name)).await?;

        debug!("Wrote {} documents to blob '{}'", documents.len(), name);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.blob_path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        tokio::fs::rename(self.blob_path(from), self.blob_path(to))
            .await
            .map_err(|e| RagError::Storage(format!("Failed to rename '{}' to '{}': {}", from, to, e)))
    }
}

/// Process-local storage, lost on drop
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    blobs: RwLock<HashMap<String, Vec<IndexedDocument>>>,
}

impl InMemoryStorage {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for InMemoryStorage {
    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.read().await.contains_key(name))
    }

    async fn read(&self, name: &str) -> Result<Vec<IndexedDocument>> {
        self.blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RagError::Storage(format!("Blob '{}' does not exist", name)))
    }

    async fn write(&self, name: &str, documents: &[IndexedDocument]) -> Result<()> {
        self.blobs
            .write()
            .await
            .insert(name.to_string(), documents.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.blobs.write().await.remove(name);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        let documents = blobs
            .remove(from)
            .ok_or_else(|| RagError::Storage(format!("Blob '{}' does not exist", from)))?;
        blobs.insert(to.to_string(), documents);
        Ok(())
    }
}
