use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::Config;
use crate::documents::load_corpus;
use crate::retrieval::{Answer, RetrievalService};
use crate::search::RetrievalResult;
use crate::store::DocumentStore;

const PREVIEW_CHARS: usize = 160;

fn load_service() -> Result<(Config, RetrievalService)> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let service = RetrievalService::from_config(&config)
        .context("Failed to set up providers. Run 'resume-rag config' or export an API key")?;
    Ok((config, service))
}

fn progress_bar(total: usize) -> ProgressBar {
    if !console::user_attended_stderr() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(bar_style) =
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} chunks embedded ({eta})")
    {
        bar.set_style(bar_style.progress_chars("=> "));
    }
    bar
}

/// Rebuild the index from a generator `cv_data.json` file
#[inline]
pub async fn ingest(corpus_path: &Path) -> Result<()> {
    let (config, service) = load_service()?;
    let documents = load_corpus(corpus_path)
        .await
        .with_context(|| format!("Failed to load {}", corpus_path.display()))?;

    if documents.is_empty() {
        warn!("Corpus {} contains no résumés", corpus_path.display());
    }

    println!(
        "{} {} résumés from {}",
        style("Indexing").bold().cyan(),
        documents.len(),
        style(corpus_path.display()).dim()
    );

    let bar = progress_bar(0);
    let stats = service
        .rebuild_index_with_progress(&documents, |processed, total| {
            bar.set_length(total as u64);
            bar.set_position(processed as u64);
        })
        .await;
    bar.finish_and_clear();
    let stats = stats.context("Indexing failed, the previous index was kept")?;

    println!(
        "{} {} chunks from {} résumés",
        style("✓ Indexed").green(),
        stats.chunks,
        stats.documents
    );
    if let Some(dimension) = stats.dimension {
        println!("  Embedding dimension: {}", dimension);
    }
    println!(
        "  Index file: {}",
        style(config.vector_store_path().display()).dim()
    );
    info!("Ingestion completed at {}", stats.completed_at.to_rfc3339());
    Ok(())
}

/// Answer a question and print it with its sources
#[inline]
pub async fn ask(question: &str, json: bool) -> Result<()> {
    let (_config, service) = load_service()?;
    let answer = service.answer(question).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&answer).context("Failed to serialize answer")?
        );
    } else {
        print!("{}", format_answer(&answer));
    }
    Ok(())
}

/// Render an answer for the terminal
#[inline]
pub fn format_answer(answer: &Answer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", answer.answer_text);

    if !answer.sources.is_empty() {
        let _ = writeln!(out, "{}", style("Sources:").bold());
        for source in &answer.sources {
            let _ = writeln!(
                out,
                "  • {} (#{}), relevance {:.3}",
                source.display_name, source.document_id, source.relevance
            );
        }
    }

    if let Some(error) = &answer.error {
        let _ = writeln!(out, "{} {}", style("Error:").red(), error);
    }
    out
}

/// Print ranked passages without generating an answer
#[inline]
pub async fn search(query: &str, exhaustive: bool) -> Result<()> {
    let (_config, service) = load_service()?;
    let results = service
        .search_passages(query, exhaustive)
        .await
        .context("Search failed")?;

    if results.is_empty() {
        println!("No passages matched. Has the index been built with 'resume-rag ingest'?");
        return Ok(());
    }

    print!("{}", format_results(&results));
    Ok(())
}

#[inline]
pub fn format_results(results: &[RetrievalResult]) -> String {
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let preview: String = result
            .content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(PREVIEW_CHARS)
            .collect();

        let _ = writeln!(
            out,
            "{}. {} [{}] similarity {:.3}",
            rank + 1,
            style(&result.metadata.display_name).bold(),
            result.metadata.chunk_id,
            result.similarity()
        );
        let _ = writeln!(out, "   {}", preview);
    }
    out
}

/// Show configuration, provider selection and index size
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    println!("{}", style("📋 Index Status").bold().cyan());
    println!();

    println!("{}", style("Providers:").bold().yellow());
    match RetrievalService::from_config(&config) {
        Ok(service) => {
            let (embedding, generation) = service.provider_summary();
            let reachable = service.test_connection().await;
            print!("{}", format_providers(&embedding, &generation, reachable));
        }
        Err(e) => println!("  {} {}", style("Not configured:").red(), e),
    }
    println!();

    println!("{}", style("Index:").bold().yellow());
    println!(
        "  File: {}",
        style(config.vector_store_path().display()).dim()
    );

    let store = DocumentStore::from_config(&config);
    match store.load().await {
        Ok(documents) if documents.is_empty() => {
            println!("  {}", style("Empty. Run 'resume-rag ingest <cv_data.json>'").yellow());
        }
        Ok(_) => {
            println!("  Chunks: {}", store.count().await?);
            println!("  Résumés: {}", store.document_count().await?);
        }
        Err(e) => println!("  {} {}", style("Unreadable:").red(), e),
    }

    Ok(())
}

/// Provider lines of the status report
#[inline]
pub fn format_providers(embedding: &str, generation: &str, reachable: bool) -> String {
    let connection = if reachable {
        style("✓ reachable").green()
    } else {
        style("✗ unreachable").red()
    };
    format!(
        "  Embeddings: {}\n  Generation: {}\n  Connection: {}\n",
        style(embedding).cyan(),
        style(generation).cyan(),
        connection
    )
}

/// Delete the index after confirmation
#[inline]
pub async fn clear(skip_confirmation: bool) -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    if !skip_confirmation
        && !Confirm::new()
            .with_prompt("Delete the résumé index?")
            .default(false)
            .interact()?
    {
        println!("Index left unchanged.");
        return Ok(());
    }

    DocumentStore::from_config(&config)
        .clear()
        .await
        .context("Failed to clear index")?;
    println!("{}", style("✓ Index cleared").green());
    Ok(())
}
