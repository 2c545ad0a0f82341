
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::time::Duration;

use super::credentials::ResolvedProviders;
use super::{Config, ConfigError, ProviderConfig, ProviderKind};
use crate::providers::{HttpTransport, OllamaClient};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Résumé RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Provider Configuration").bold().yellow());
    eprintln!("Choose where embeddings and answers come from.");
    eprintln!("API keys are read from the environment and never written to disk.");
    eprintln!();

    configure_provider(&mut config.provider)?;
    configure_index(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_provider_setup(&config.provider) {
        eprintln!("{}", style("✓ Provider setup looks usable!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: provider is not reachable or has no credentials").yellow()
        );
        eprintln!("You can continue, but fix this before ingesting or asking questions.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Provider Settings:").bold().yellow());
    eprintln!("  Kind: {}", style(config.provider.kind.as_str()).cyan());
    match ResolvedProviders::resolve(&config.provider) {
        Ok(resolved) => {
            let embedding_model = config
                .provider
                .embedding_model
                .as_deref()
                .unwrap_or_else(|| resolved.embedding.default_embedding_model());
            let generation_model = config
                .provider
                .generation_model
                .as_deref()
                .unwrap_or_else(|| resolved.generation.default_generation_model());
            eprintln!(
                "  Embeddings: {} ({})",
                style(resolved.embedding.name()).cyan(),
                embedding_model
            );
            eprintln!(
                "  Generation: {} ({})",
                style(resolved.generation.name()).cyan(),
                generation_model
            );
        }
        Err(e) => eprintln!("  Credentials: {} ({})", style("Missing").red(), e),
    }
    if config.provider.kind == ProviderKind::Ollama {
        eprintln!("  Ollama URL: {}", style(&config.provider.ollama_url).cyan());
    }
    eprintln!("  Temperature: {}", style(config.provider.temperature).cyan());

    eprintln!();
    eprintln!("{}", style("Index Settings:").bold().yellow());
    eprintln!("  Batch Size: {}", style(config.index.batch_size).cyan());
    eprintln!(
        "  Batch Delay: {}ms",
        style(config.index.batch_delay_ms).cyan()
    );
    eprintln!(
        "  Chunk Window: {} chars ({} overlap)",
        style(config.chunking.window_size).cyan(),
        config.chunking.overlap
    );
    eprintln!(
        "  Similarity Threshold: {}",
        style(config.retrieval.similarity_threshold).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    eprintln!(
        "Index file: {}",
        style(config.vector_store_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = Config::config_dir().context("Failed to locate config directory")?;
    Config::load(&config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No usable configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.clone(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_provider(provider: &mut ProviderConfig) -> Result<()> {
    let names: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
    let default_index = ProviderKind::ALL
        .iter()
        .position(|&k| k == provider.kind)
        .unwrap_or(0);

    let kind_index = Select::new()
        .with_prompt("Provider")
        .default(default_index)
        .items(&names)
        .interact()?;
    provider.set_kind(ProviderKind::ALL[kind_index]);

    if provider.kind == ProviderKind::Ollama {
        let url: String = Input::new()
            .with_prompt("Ollama URL")
            .default(provider.ollama_url.clone())
            .validate_with(|input: &String| -> Result<(), ConfigError> {
                let temp_config = ProviderConfig {
                    ollama_url: input.clone(),
                    ..ProviderConfig::default()
                };
                temp_config.ollama_base_url()?;
                Ok(())
            })
            .interact_text()?;
        provider.set_ollama_url(url)?;
    }

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model (empty for provider default)")
        .default(provider.embedding_model.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    provider.set_embedding_model(non_empty(embedding_model))?;

    let generation_model: String = Input::new()
        .with_prompt("Chat model (empty for provider default)")
        .default(provider.generation_model.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    provider.set_generation_model(non_empty(generation_model))?;

    Ok(())
}

fn configure_index(config: &mut Config) -> Result<()> {
    let batch_size: usize = Input::new()
        .with_prompt("Chunks embedded concurrently per batch")
        .default(config.index.batch_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 100 {
                Err("Batch size must be 100 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    config.index.set_batch_size(batch_size)?;
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn test_provider_setup(provider: &ProviderConfig) -> bool {
    if ResolvedProviders::resolve(provider).is_err() {
        return false;
    }

    if provider.kind != ProviderKind::Ollama {
        return true;
    }

    let Ok(base_url) = provider.ollama_base_url() else {
        return false;
    };

    let client = OllamaClient::new(base_url, provider).with_transport(
        HttpTransport::new(Duration::from_secs(5)).with_retry_attempts(1),
    );
    client.list_models().is_ok()
}
