//! OpenAI-compatible client, used for both OpenAI and OpenRouter.


use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::transport::{HttpTransport, run_blocking};
use super::{EmbeddingClient, GenerationClient};
use crate::RagError;
use crate::config::ProviderConfig;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1/";

#[derive(Clone)]
pub struct OpenAiClient {
    label: &'static str,
    base_url: Url,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    temperature: f32,
    max_output_tokens: u32,
    transport: HttpTransport,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    #[inline]
    pub fn openai(api_key: String, config: &ProviderConfig) -> crate::Result<Self> {
        Self::with_endpoint("OpenAI", OPENAI_BASE_URL, api_key, config)
    }

    #[inline]
    pub fn openrouter(api_key: String, config: &ProviderConfig) -> crate::Result<Self> {
        Self::with_endpoint("OpenRouter", OPENROUTER_BASE_URL, api_key, config)
    }

    fn with_endpoint(
        label: &'static str,
        base_url: &str,
        api_key: String,
        config: &ProviderConfig,
    ) -> crate::Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::Config(format!("{} API key must not be empty", label)));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| RagError::Config(format!("Invalid {} URL: {}", label, e)))?;

        Ok(Self {
            label,
            base_url,
            api_key,
            embedding_model: "text-embedding-ada-002".to_string(),
            generation_model: "gpt-3.5-turbo".to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            transport: HttpTransport::default(),
        })
    }

    /// Point the client at another OpenAI-compatible endpoint.
    /// The URL must end with a slash so relative joins keep its path.
    #[inline]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    #[inline]
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    #[inline]
    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    #[inline]
    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    fn auth_headers(&self) -> [(&'static str, String); 1] {
        [("Authorization", format!("Bearer {}", self.api_key))]
    }

    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            "Requesting {} embedding (text length: {})",
            self.label,
            text.len()
        );

        let url = self
            .base_url
            .join("embeddings")
            .context("Failed to build embeddings URL")?;

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response_text = self
            .transport
            .post_json(&url, &self.auth_headers(), &request)
            .with_context(|| format!("{} embedding request failed", self.label))?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text)
            .context("Failed to parse embeddings response")?;

        response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| anyhow::anyhow!("{} returned no embedding", self.label))
    }

    #[inline]
    pub fn generate_completion(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting {} completion with {} (prompt length: {})",
            self.label,
            self.generation_model,
            prompt.len()
        );

        let url = self
            .base_url
            .join("chat/completions")
            .context("Failed to build chat URL")?;

        let request = ChatRequest {
            model: &self.generation_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_output_tokens,
        };

        let response_text = self
            .transport
            .post_json(&url, &self.auth_headers(), &request)
            .with_context(|| format!("{} chat request failed", self.label))?;

        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("{} returned no completion", self.label))
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        let client = self.clone();
        let text = text.to_string();
        run_blocking(move || client.generate_embedding(&text))
            .await
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.label, self.embedding_model)
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> crate::Result<String> {
        let client = self.clone();
        let prompt = prompt.to_string();
        run_blocking(move || client.generate_completion(&prompt))
            .await
            .map_err(|e| RagError::Generation(format!("{:#}", e)))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.label, self.generation_model)
    }
}
