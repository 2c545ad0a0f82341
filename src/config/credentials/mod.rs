//! Provider credential resolution.
//!
//! Credentials are read from the environment exactly once, at startup, and
//! turned into a [`ResolvedProviders`] value that is handed to the provider
//! constructors. Nothing downstream looks at the environment again.


use std::fmt;

use tracing::{debug, info};
use url::Url;

use super::settings::{ConfigError, ProviderConfig, ProviderKind};

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_AI_API_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// A concrete provider together with whatever it needs to authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum Provider {
    Gemini { api_key: String },
    OpenAi { api_key: String },
    OpenRouter { api_key: String },
    Ollama { base_url: Url },
}

impl Provider {
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "Google AI",
            Self::OpenAi { .. } => "OpenAI",
            Self::OpenRouter { .. } => "OpenRouter",
            Self::Ollama { .. } => "Ollama",
        }
    }

    #[inline]
    pub const fn default_embedding_model(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "embedding-001",
            Self::OpenAi { .. } | Self::OpenRouter { .. } => "text-embedding-ada-002",
            Self::Ollama { .. } => "nomic-embed-text:latest",
        }
    }

    #[inline]
    pub const fn default_generation_model(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini-1.5-flash",
            Self::OpenAi { .. } => "gpt-3.5-turbo",
            Self::OpenRouter { .. } => "openai/gpt-3.5-turbo",
            Self::Ollama { .. } => "llama3.2",
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini { .. } => f.debug_struct("Gemini").field("api_key", &"***").finish(),
            Self::OpenAi { .. } => f.debug_struct("OpenAi").field("api_key", &"***").finish(),
            Self::OpenRouter { .. } => f
                .debug_struct("OpenRouter")
                .field("api_key", &"***")
                .finish(),
            Self::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", &base_url.as_str())
                .finish(),
        }
    }
}

/// The providers chosen for embedding and for answer generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProviders {
    pub embedding: Provider,
    pub generation: Provider,
}

impl ResolvedProviders {
    /// Resolve against the process environment
    #[inline]
    pub fn resolve(config: &ProviderConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the environment
    #[inline]
    pub fn resolve_with<F>(config: &ProviderConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let gemini = || {
            key(GOOGLE_API_KEY_VAR).map(|api_key| Provider::Gemini { api_key })
        };
        let openai = || key(OPENAI_API_KEY_VAR).map(|api_key| Provider::OpenAi { api_key });
        let openrouter = || {
            key(OPENROUTER_API_KEY_VAR).map(|api_key| Provider::OpenRouter { api_key })
        };

        let missing = |purpose: &'static str, keys: &[&str]| ConfigError::MissingCredentials {
            purpose,
            keys: keys.join(", "),
        };

        // OpenRouter has no embeddings endpoint, so embeddings always come
        // from the Google/OpenAI chain unless Ollama is selected.
        let embedding_chain = || {
            gemini()
                .or_else(openai)
                .ok_or_else(|| missing("embedding", &[GOOGLE_API_KEY_VAR, OPENAI_API_KEY_VAR]))
        };

        let resolved = match config.kind {
            ProviderKind::Auto => Self {
                embedding: embedding_chain()?,
                generation: gemini().or_else(openai).or_else(openrouter).ok_or_else(|| {
                    missing(
                        "generation",
                        &[GOOGLE_API_KEY_VAR, OPENAI_API_KEY_VAR, OPENROUTER_API_KEY_VAR],
                    )
                })?,
            },
            ProviderKind::Gemini => {
                let provider = gemini().ok_or_else(|| missing("Google AI", &[GOOGLE_API_KEY_VAR]))?;
                Self {
                    embedding: provider.clone(),
                    generation: provider,
                }
            }
            ProviderKind::OpenAi => {
                let provider = openai().ok_or_else(|| missing("OpenAI", &[OPENAI_API_KEY_VAR]))?;
                Self {
                    embedding: provider.clone(),
                    generation: provider,
                }
            }
            ProviderKind::OpenRouter => Self {
                embedding: embedding_chain()?,
                generation: openrouter()
                    .ok_or_else(|| missing("OpenRouter", &[OPENROUTER_API_KEY_VAR]))?,
            },
            ProviderKind::Ollama => {
                let provider = Provider::Ollama {
                    base_url: config.ollama_base_url()?,
                };
                Self {
                    embedding: provider.clone(),
                    generation: provider,
                }
            }
        };

        debug!("Resolved providers: {:?}", resolved);
        info!(
            "Using {} embeddings and {} for generation",
            resolved.embedding.name(),
            resolved.generation.name()
        );

        Ok(resolved)
    }
}
