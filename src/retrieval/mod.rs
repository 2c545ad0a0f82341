//! Question answering over the résumé index.
//!
//! [`RetrievalService`] is built once and shared. It embeds the question,
//! ranks passages from the [`DocumentStore`], and asks the generation client
//! to answer from those passages only. Failures while answering never
//! propagate: the caller receives [`FALLBACK_ANSWER`] with the error detail.


pub mod prompts;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ResolvedProviders, RetrievalConfig};
use crate::documents::SourceDocument;
use crate::embeddings::{ChunkingConfig, chunk_corpus};
use crate::providers::{EmbeddingClient, GenerationClient, build_clients};
use crate::search::{self, RetrievalResult};
use crate::store::{DocumentStore, RebuildStats};
use crate::{RagError, Result};

pub const FALLBACK_ANSWER: &str =
    "Sorry, there was an error processing your question. Please try again.";

const CONNECTION_PROBE: &str = "Reply with only \"OK\" if you can read this message.";

const BROAD_TERMS: &[&str] = &[
    // interrogatives and quantifiers
    "who", "which", "find", "list", "all", "any", "candidates", "anyone",
    "quien", "quién", "quienes", "quiénes", "cual", "cuál", "cuales", "cuáles",
    "buscar", "todos", "candidatos", "alguien",
    // skills
    "python", "java", "javascript", "typescript", "rust", "go", "react", "node",
    "sql", "aws", "docker", "kubernetes", "excel",
    // roles
    "developer", "engineer", "designer", "manager", "analyst", "scientist",
    "desarrollador", "ingeniero", "diseñador", "gerente", "analista",
];

/// How wide a question is. Both scopes currently search every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    Broad,
    Specific,
}

/// Keyword match on whole words, case-insensitive
#[inline]
pub fn classify_query(query: &str) -> QueryScope {
    let lowered = query.to_lowercase();
    let broad = lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| BROAD_TERMS.contains(&word));

    if broad {
        QueryScope::Broad
    } else {
        QueryScope::Specific
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub display_name: String,
    pub document_id: u32,
    /// Cosine similarity of the passage that was used
    pub relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub query: String,
    pub answer_text: String,
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Answer {
    fn fallback(query: &str, error: &RagError) -> Self {
        Self {
            query: query.to_string(),
            answer_text: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingClient>,
    generator: Arc<dyn GenerationClient>,
    store: DocumentStore,
    chunking: ChunkingConfig,
    retrieval: RetrievalConfig,
    request_timeout: Duration,
}

impl RetrievalService {
    #[inline]
    pub fn new(
        config: &Config,
        embedder: Arc<dyn EmbeddingClient>,
        generator: Arc<dyn GenerationClient>,
        store: DocumentStore,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            chunking: config.chunking.clone(),
            retrieval: config.retrieval.clone(),
            request_timeout: Duration::from_secs(config.retrieval.request_timeout_secs),
        }
    }

    /// Resolve providers from the environment and open the on-disk index
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolved = ResolvedProviders::resolve(&config.provider)?;
        let (embedder, generator) = build_clients(&resolved, &config.provider)?;

        info!(
            "Using {} for embeddings and {} for generation",
            embedder.describe(),
            generator.describe()
        );

        Ok(Self::new(
            config,
            embedder,
            generator,
            DocumentStore::from_config(config),
        ))
    }

    #[inline]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Embedding and generation client descriptions
    #[inline]
    pub fn provider_summary(&self) -> (String, String) {
        (self.embedder.describe(), self.generator.describe())
    }

    async fn with_timeout<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match timeout(self.request_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(RagError::Timeout {
                operation: operation.to_string(),
                seconds: self.request_timeout.as_secs(),
            }),
        }
    }

    /// Answer a question from the indexed résumés
    #[inline]
    pub async fn answer(&self, query: &str) -> Answer {
        match self.try_answer(query).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to answer query {:?}: {}", query, e);
                Answer::fallback(query, &e)
            }
        }
    }

    async fn try_answer(&self, query: &str) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            return Err(anyhow::anyhow!("Query must not be empty").into());
        }

        info!("Answering query: {:?}", query);
        let results = self.search_passages(query, false).await?;

        let prompt = prompts::build_prompt(query, &results);
        debug!(
            "Prompt built from {} passages ({} chars)",
            results.len(),
            prompt.len()
        );

        let answer_text = self
            .with_timeout("answer generation", self.generator.complete(&prompt))
            .await?;

        let sources = results
            .iter()
            .map(|result| Source {
                display_name: result.metadata.display_name.clone(),
                document_id: result.metadata.document_id,
                relevance: result.similarity(),
            })
            .collect();

        Ok(Answer {
            query: query.to_string(),
            answer_text,
            sources,
            error: None,
        })
    }

    /// Rank indexed passages against `query`.
    ///
    /// Bounded search returns the best passage per candidate. Exhaustive
    /// search returns every passage.
    #[inline]
    pub async fn search_passages(
        &self,
        query: &str,
        exhaustive: bool,
    ) -> Result<Vec<RetrievalResult>> {
        let scope = classify_query(query);
        let documents = self.store.load().await?;
        let k = self.store.document_count().await?;
        debug!("Query scope {:?}, searching for up to {} candidates", scope, k);

        let vector = self
            .with_timeout("query embedding", self.embedder.embed(query))
            .await?;

        if exhaustive {
            search::exhaustive(&vector, &documents)
        } else {
            search::search(
                &vector,
                &documents,
                k,
                self.retrieval.similarity_threshold,
            )
        }
    }

    #[inline]
    pub async fn rebuild_index(&self, documents: &[SourceDocument]) -> Result<RebuildStats> {
        self.rebuild_index_with_progress(documents, |_, _| {}).await
    }

    /// Chunk and embed every document, replacing the current index
    #[inline]
    pub async fn rebuild_index_with_progress<F>(
        &self,
        documents: &[SourceDocument],
        progress: F,
    ) -> Result<RebuildStats>
    where
        F: FnMut(usize, usize) + Send,
    {
        let chunks = chunk_corpus(documents, &self.chunking);
        info!(
            "Indexing {} documents as {} chunks",
            documents.len(),
            chunks.len()
        );

        self.store
            .rebuild_with_progress(&chunks, self.embedder.as_ref(), progress)
            .await
    }

    /// Number of indexed chunks
    #[inline]
    pub async fn index_size(&self) -> Result<usize> {
        self.store.count().await
    }

    #[inline]
    pub async fn document_count(&self) -> Result<usize> {
        self.store.document_count().await
    }

    #[inline]
    pub async fn clear_index(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Ask the generation client for a fixed reply
    #[inline]
    pub async fn test_connection(&self) -> bool {
        match self
            .with_timeout("connection test", self.generator.complete(CONNECTION_PROBE))
            .await
        {
            Ok(reply) if reply.trim() == "OK" => {
                info!("Generation client {} is reachable", self.generator.describe());
                true
            }
            Ok(reply) => {
                warn!("Unexpected connection test reply: {:?}", reply);
                false
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                false
            }
        }
    }
}
