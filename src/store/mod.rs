//! Persisted vector index for résumé chunks.
//!
//! The whole index lives in one blob and is replaced wholesale by
//! [`DocumentStore::rebuild`]. Readers get a shared snapshot from
//! [`DocumentStore::load`] that stays valid until the next rebuild.


pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{Config, IndexConfig};
use crate::embeddings::Chunk;
use crate::providers::EmbeddingClient;
use crate::{RagError, Result};

pub use storage::{BlobStorage, InMemoryStorage, JsonFileStorage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub document_id: u32,
    pub display_name: String,
    pub chunk_id: String,
}

/// A chunk together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: DocumentMetadata,
}

impl IndexedDocument {
    #[inline]
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.chunk_id.clone(),
            content: chunk.text.clone(),
            embedding,
            metadata: DocumentMetadata {
                document_id: chunk.document_id,
                display_name: chunk.display_name.clone(),
                chunk_id: chunk.chunk_id.clone(),
            },
        }
    }
}

/// Outcome of a successful rebuild
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildStats {
    pub chunks: usize,
    pub documents: usize,
    pub dimension: Option<usize>,
    pub completed_at: DateTime<Utc>,
}

pub struct DocumentStore {
    storage: Arc<dyn BlobStorage>,
    config: IndexConfig,
    snapshot: RwLock<Option<Arc<Vec<IndexedDocument>>>>,
}

/// Every embedding must share the dimension of the first one, or `expected`
/// when it is set.
fn check_dimensions<'a, I>(embeddings: I, expected: Option<usize>) -> Result<Option<usize>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut dimension = expected;
    for embedding in embeddings {
        match dimension {
            None => dimension = Some(embedding.len()),
            Some(expected) if expected != embedding.len() => {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(dimension)
}

fn distinct_documents(documents: &[IndexedDocument]) -> usize {
    documents
        .iter()
        .map(|doc| doc.metadata.document_id)
        .unique()
        .count()
}

impl DocumentStore {
    #[inline]
    pub fn new(storage: Arc<dyn BlobStorage>, config: IndexConfig) -> Self {
        Self {
            storage,
            config,
            snapshot: RwLock::new(None),
        }
    }

    /// Store backed by JSON files in the configured data directory
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        let storage = JsonFileStorage::new(config.data_dir());
        Self::new(Arc::new(storage), config.index.clone())
    }

    fn live_blob(&self) -> &str {
        &self.config.store_name
    }

    fn staging_blob(&self) -> String {
        format!("{}.staging", self.config.store_name)
    }

    #[inline]
    pub async fn rebuild(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingClient,
    ) -> Result<RebuildStats> {
        self.rebuild_with_progress(chunks, embedder, |_, _| {}).await
    }

    /// Embed every chunk and replace the index with the result.
    ///
    /// `progress` is called with `(processed, total)` after each batch.
    /// On error the previous index is left in place.
    #[inline]
    pub async fn rebuild_with_progress<F>(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingClient,
        progress: F,
    ) -> Result<RebuildStats>
    where
        F: FnMut(usize, usize) + Send,
    {
        info!(
            "Rebuilding index '{}' from {} chunks using {}",
            self.live_blob(),
            chunks.len(),
            embedder.describe()
        );

        *self.snapshot.write().await = None;
        let staging = self.staging_blob();
        self.storage.delete(&staging).await?;

        let documents = match self
            .embed_into_staging(chunks, embedder, &staging, progress)
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                error!("Index rebuild failed, keeping previous index: {}", e);
                if let Err(cleanup) = self.storage.delete(&staging).await {
                    warn!("Failed to remove staging index: {}", cleanup);
                }
                return Err(e);
            }
        };

        self.storage.rename(&staging, self.live_blob()).await?;

        let stats = RebuildStats {
            chunks: documents.len(),
            documents: distinct_documents(&documents),
            dimension: documents.first().map(|doc| doc.embedding.len()),
            completed_at: Utc::now(),
        };
        *self.snapshot.write().await = Some(Arc::new(documents));

        info!(
            "Index rebuilt: {} chunks from {} documents",
            stats.chunks, stats.documents
        );
        Ok(stats)
    }

    async fn embed_into_staging<F>(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingClient,
        staging: &str,
        mut progress: F,
    ) -> Result<Vec<IndexedDocument>>
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = chunks.len();
        let batch_size = self.config.batch_size.max(1);
        let persist_every = self.config.persist_every.max(1);
        let delay = Duration::from_millis(self.config.batch_delay_ms);

        let mut documents: Vec<IndexedDocument> = Vec::with_capacity(total);
        let mut dimension = self.config.expected_dimension;
        let mut last_persisted = 0;

        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            if batch_index > 0 && !delay.is_zero() {
                sleep(delay).await;
            }

            let embeddings =
                try_join_all(batch.iter().map(|chunk| embedder.embed(&chunk.text))).await?;

            dimension = check_dimensions(embeddings.iter().map(Vec::as_slice), dimension)?;

            documents.extend(
                batch
                    .iter()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| IndexedDocument::from_chunk(chunk, embedding)),
            );

            let processed = documents.len();
            if processed - last_persisted >= persist_every || processed == total {
                self.storage.write(staging, &documents).await?;
                last_persisted = processed;
                debug!("Persisted {}/{} chunks to staging", processed, total);
            }

            progress(processed, total);
        }

        if total == 0 {
            self.storage.write(staging, &documents).await?;
        }

        Ok(documents)
    }

    /// Current index snapshot, read from storage on first use
    #[inline]
    pub async fn load(&self) -> Result<Arc<Vec<IndexedDocument>>> {
        let cached = self.snapshot.read().await.clone();
        if let Some(snapshot) = cached {
            return Ok(snapshot);
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let documents = if self.storage.exists(self.live_blob()).await? {
            self.storage.read(self.live_blob()).await?
        } else {
            debug!("No index '{}' found, starting empty", self.live_blob());
            Vec::new()
        };

        check_dimensions(
            documents.iter().map(|doc| doc.embedding.as_slice()),
            self.config.expected_dimension,
        )?;

        info!("Loaded {} indexed chunks", documents.len());
        let snapshot = Arc::new(documents);
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Number of indexed chunks
    #[inline]
    pub async fn count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// Number of distinct source documents in the index
    #[inline]
    pub async fn document_count(&self) -> Result<usize> {
        Ok(distinct_documents(&self.load().await?))
    }

    #[inline]
    pub async fn clear(&self) -> Result<()> {
        let mut guard = self.snapshot.write().await;
        self.storage.delete(self.live_blob()).await?;
        self.storage.delete(&self.staging_blob()).await?;
        *guard = Some(Arc::new(Vec::new()));
        info!("Cleared index '{}'", self.live_blob());
        Ok(())
    }
}
