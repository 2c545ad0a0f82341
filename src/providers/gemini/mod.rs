//! Google Generative Language API client.


use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::transport::{HttpTransport, run_blocking};
use super::{EmbeddingClient, GenerationClient};
use crate::RagError;
use crate::config::ProviderConfig;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

#[derive(Clone)]
pub struct GeminiClient {
    base_url: Url,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    temperature: f32,
    max_output_tokens: u32,
    transport: HttpTransport,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    #[inline]
    pub fn new(api_key: String, config: &ProviderConfig) -> crate::Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::Config(
                "Google AI API key must not be empty".to_string(),
            ));
        }

        let base_url = Url::parse(GEMINI_BASE_URL)
            .map_err(|e| RagError::Config(format!("Invalid Gemini URL: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            embedding_model: "embedding-001".to_string(),
            generation_model: "gemini-1.5-flash".to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            transport: HttpTransport::default(),
        })
    }

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

    fn model_url(&self, model: &str, action: &str) -> Result<Url> {
        self.base_url
            .join(&format!("models/{}:{}", model, action))
            .with_context(|| format!("Failed to build {} URL", action))
    }

    fn auth_headers(&self) -> [(&'static str, String); 1] {
        [("x-goog-api-key", self.api_key.clone())]
    }

    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Requesting Gemini embedding (text length: {})", text.len());

        let url = self.model_url(&self.embedding_model, "embedContent")?;
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response_text = self
            .transport
            .post_json(&url, &self.auth_headers(), &request)
            .context("Gemini embedding request failed")?;

        let response: EmbedContentResponse = serde_json::from_str(&response_text)
            .context("Failed to parse embedContent response")?;

        if response.embedding.values.is_empty() {
            anyhow::bail!("Gemini returned an empty embedding");
        }
        Ok(response.embedding.values)
    }

    #[inline]
    pub fn generate_completion(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting Gemini completion with {} (prompt length: {})",
            self.generation_model,
            prompt.len()
        );

        let url = self.model_url(&self.generation_model, "generateContent")?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response_text = self
            .transport
            .post_json(&url, &self.auth_headers(), &request)
            .context("Gemini generateContent request failed")?;

        let response: GenerateContentResponse = serde_json::from_str(&response_text)
            .context("Failed to parse generateContent response")?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("Gemini returned no candidates");
        }
        Ok(text)
    }
}

#[async_trait]
impl EmbeddingClient for GeminiClient {
    async fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        let client = self.clone();
        let text = text.to_string();
        run_blocking(move || client.generate_embedding(&text))
            .await
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))
    }

    fn describe(&self) -> String {
        format!("Gemini ({})", self.embedding_model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> crate::Result<String> {
        let client = self.clone();
        let prompt = prompt.to_string();
        run_blocking(move || client.generate_completion(&prompt))
            .await
            .map_err(|e| RagError::Generation(format!("{:#}", e)))
    }

    fn describe(&self) -> String {
        format!("Gemini ({})", self.generation_model)
    }
}
