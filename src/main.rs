use std::path::PathBuf;

use clap::{Parser, Subcommand};
use resume_rag::Result;
use resume_rag::commands::{ask, clear, ingest, search, show_status};
use resume_rag::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "resume-rag")]
#[command(about = "Ask questions about a set of résumés using retrieval-augmented generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure providers, chunking and indexing
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the index from a cv_data.json file
    Ingest {
        /// JSON array of résumés as written by the CV generator
        corpus: PathBuf,
    },
    /// Ask a question about the indexed résumés
    Ask {
        question: String,
        /// Print the answer and sources as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the passages that best match a query
    Search {
        query: String,
        /// Return every passage instead of the best one per résumé
        #[arg(long)]
        exhaustive: bool,
    },
    /// Show provider selection and index size
    Status,
    /// Delete the index
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { corpus } => {
            ingest(&corpus).await?;
        }
        Commands::Ask { question, json } => {
            ask(&question, json).await?;
        }
        Commands::Search { query, exhaustive } => {
            search(&query, exhaustive).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
        Commands::Clear { yes } => {
            clear(yes).await?;
        }
    }

    Ok(())
}
