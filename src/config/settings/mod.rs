
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::embeddings::chunking::ChunkingConfig;

/// Environment variable that overrides the configuration directory
pub const HOME_ENV_VAR: &str = "RESUME_RAG_HOME";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Which provider family to use. `Auto` walks the credential chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Auto,
    Gemini,
    OpenAi,
    OpenRouter,
    Ollama,
}

impl ProviderKind {
    pub const ALL: [Self; 5] = [
        Self::Auto,
        Self::Gemini,
        Self::OpenAi,
        Self::OpenRouter,
        Self::Ollama,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Overrides the provider's default embedding model
    pub embedding_model: Option<String>,
    /// Overrides the provider's default chat model
    pub generation_model: Option<String>,
    pub ollama_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Auto,
            embedding_model: None,
            generation_model: None,
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of chunks embedded concurrently per batch
    pub batch_size: usize,
    /// Pause between batches, in milliseconds
    pub batch_delay_ms: u64,
    /// Persist staging progress every N chunks
    pub persist_every: usize,
    /// Name of the index blob inside the data directory
    pub store_name: String,
    /// When set, every embedding must have exactly this many dimensions
    pub expected_dimension: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            batch_delay_ms: 50,
            persist_every: 1000,
            store_name: "vector_store".to_string(),
            expected_dimension: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Bounded search drops passages scoring at or below this similarity
    pub similarity_threshold: f32,
    /// Upper bound on each embedding or generation call made while answering
    pub request_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::search::DEFAULT_SIMILARITY_THRESHOLD,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid max output tokens: {0} (must be between 1 and 32768)")]
    InvalidMaxOutputTokens(u32),
    #[error("Invalid batch size: {0} (must be between 1 and 100)")]
    InvalidBatchSize(usize),
    #[error("Invalid persist interval: {0} (must be greater than 0)")]
    InvalidPersistInterval(usize),
    #[error("Invalid store name: {0:?} (must be a non-empty file stem)")]
    InvalidStoreName(String),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 8192)")]
    InvalidEmbeddingDimension(usize),
    #[error("Invalid window size: {0} (must be between 50 and 4096)")]
    InvalidWindowSize(usize),
    #[error("Overlap ({0}) must be smaller than the window size ({1})")]
    InvalidOverlap(usize, usize),
    #[error("Minimum chunk length ({0}) must be smaller than the window size ({1})")]
    InvalidMinChunkLength(usize, usize),
    #[error("Invalid iteration cap: {0} (must be greater than 0)")]
    InvalidMaxIterations(usize),
    #[error("Invalid similarity threshold: {0} (must be between -1.0 and 1.0)")]
    InvalidThreshold(f32),
    #[error("Invalid request timeout: {0} (must be between 1 and 600 seconds)")]
    InvalidTimeout(u64),
    #[error("No {purpose} credentials found. Please set one of: {keys}")]
    MissingCredentials { purpose: &'static str, keys: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<ConfigError> for crate::RagError {
    #[inline]
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

impl Config {
    /// Directory holding `config.toml` and the data directory
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Some(home) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }

        dirs::config_dir()
            .map(|dir| dir.join("resume-rag"))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load from the default configuration directory
    #[inline]
    pub fn load_default() -> Result<Self> {
        let config_dir = Self::config_dir().context("Failed to locate config directory")?;
        Self::load(config_dir)
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider.validate()?;
        self.index.validate()?;
        self.retrieval.validate()?;
        self.validate_chunking_config()?;
        Ok(())
    }

    fn validate_chunking_config(&self) -> Result<(), ConfigError> {
        let config = &self.chunking;

        if !(50..=4096).contains(&config.window_size) {
            return Err(ConfigError::InvalidWindowSize(config.window_size));
        }

        if config.overlap >= config.window_size {
            return Err(ConfigError::InvalidOverlap(
                config.overlap,
                config.window_size,
            ));
        }

        if config.min_chunk_length >= config.window_size {
            return Err(ConfigError::InvalidMinChunkLength(
                config.min_chunk_length,
                config.window_size,
            ));
        }

        if config.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(config.max_iterations));
        }

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    /// Directory the index blobs are written to
    #[inline]
    pub fn data_dir(&self) -> PathBuf {
        self.get_base_dir().join("data")
    }

    /// Full path of the live index file
    #[inline]
    pub fn vector_store_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", self.index.store_name))
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama_base_url()?;

        for model in [&self.embedding_model, &self.generation_model]
            .into_iter()
            .flatten()
        {
            if model.trim().is_empty() {
                return Err(ConfigError::InvalidModel(model.clone()));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        if !(1..=32768).contains(&self.max_output_tokens) {
            return Err(ConfigError::InvalidMaxOutputTokens(self.max_output_tokens));
        }

        Ok(())
    }

    pub fn ollama_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.ollama_url)
            .map_err(|_| ConfigError::InvalidUrl(self.ollama_url.clone()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(self.ollama_url.clone()));
        }
        Ok(url)
    }

    pub fn set_kind(&mut self, kind: ProviderKind) {
        self.kind = kind;
    }

    pub fn set_ollama_url(&mut self, url: String) -> Result<(), ConfigError> {
        let temp_config = ProviderConfig {
            ollama_url: url.clone(),
            ..self.clone()
        };
        temp_config.ollama_base_url()?;
        self.ollama_url = url;
        Ok(())
    }

    pub fn set_embedding_model(&mut self, model: Option<String>) -> Result<(), ConfigError> {
        if let Some(name) = &model {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidModel(name.clone()));
            }
        }
        self.embedding_model = model;
        Ok(())
    }

    pub fn set_generation_model(&mut self, model: Option<String>) -> Result<(), ConfigError> {
        if let Some(name) = &model {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidModel(name.clone()));
            }
        }
        self.generation_model = model;
        Ok(())
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.batch_size) {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if self.persist_every == 0 {
            return Err(ConfigError::InvalidPersistInterval(self.persist_every));
        }

        let name = self.store_name.trim();
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidStoreName(self.store_name.clone()));
        }

        if let Some(dimension) = self.expected_dimension {
            if !(1..=8192).contains(&dimension) {
                return Err(ConfigError::InvalidEmbeddingDimension(dimension));
            }
        }

        Ok(())
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&batch_size) {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(())
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }

        if !(1..=600).contains(&self.request_timeout_secs) {
            return Err(ConfigError::InvalidTimeout(self.request_timeout_secs));
        }

        Ok(())
    }
}
