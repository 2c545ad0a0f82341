//! Embedding and generation collaborators.
//!
//! The retrieval core only sees the [`EmbeddingClient`] and
//! [`GenerationClient`] traits. The concrete HTTP clients below are built
//! once from [`ResolvedProviders`] and shared behind `Arc`s.

pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{RagError, Result};
use crate::config::{Provider, ProviderConfig, ResolvedProviders};

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use transport::HttpTransport;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Fails with [`crate::RagError::Embedding`] when the provider call fails
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Human-readable provider and model, for logs
    fn describe(&self) -> String;
}

/// Produces a completion for a single prompt
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Fails with [`crate::RagError::Generation`] when the provider call fails
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn describe(&self) -> String;
}

/// Build the embedding client for a resolved provider
#[inline]
pub fn build_embedding_client(
    provider: &Provider,
    config: &ProviderConfig,
) -> Result<Arc<dyn EmbeddingClient>> {
    let model = config
        .embedding_model
        .clone()
        .unwrap_or_else(|| provider.default_embedding_model().to_string());

    let client: Arc<dyn EmbeddingClient> = match provider {
        Provider::Gemini { api_key } => Arc::new(
            GeminiClient::new(api_key.clone(), config)?.with_embedding_model(model),
        ),
        Provider::OpenAi { api_key } => Arc::new(
            OpenAiClient::openai(api_key.clone(), config)?.with_embedding_model(model),
        ),
        Provider::OpenRouter { .. } => {
            return Err(RagError::Config(
                "OpenRouter does not serve embeddings; configure a Google or OpenAI key"
                    .to_string(),
            ));
        }
        Provider::Ollama { base_url } => {
            Arc::new(OllamaClient::new(base_url.clone(), config).with_embedding_model(model))
        }
    };

    Ok(client)
}

/// Build the generation client for a resolved provider
#[inline]
pub fn build_generation_client(
    provider: &Provider,
    config: &ProviderConfig,
) -> Result<Arc<dyn GenerationClient>> {
    let model = config
        .generation_model
        .clone()
        .unwrap_or_else(|| provider.default_generation_model().to_string());

    let client: Arc<dyn GenerationClient> = match provider {
        Provider::Gemini { api_key } => Arc::new(
            GeminiClient::new(api_key.clone(), config)?.with_generation_model(model),
        ),
        Provider::OpenAi { api_key } => Arc::new(
            OpenAiClient::openai(api_key.clone(), config)?.with_generation_model(model),
        ),
        Provider::OpenRouter { api_key } => Arc::new(
            OpenAiClient::openrouter(api_key.clone(), config)?.with_generation_model(model),
        ),
        Provider::Ollama { base_url } => {
            Arc::new(OllamaClient::new(base_url.clone(), config).with_generation_model(model))
        }
    };

    Ok(client)
}

/// Build both clients from the resolved provider pair
#[inline]
pub fn build_clients(
    resolved: &ResolvedProviders,
    config: &ProviderConfig,
) -> Result<(Arc<dyn EmbeddingClient>, Arc<dyn GenerationClient>)> {
    Ok((
        build_embedding_client(&resolved.embedding, config)?,
        build_generation_client(&resolved.generation, config)?,
    ))
}
