//! Proceedings CLI - batch indexing and offline querying
//!
//! ```bash
//! # Chunk every session PDF
//! proceedings-cli index
//!
//! # Rank chunks without calling the model
//! proceedings-cli search session_12.pdf "προϋπολογισμός"
//!
//! # Ask a question
//! proceedings-cli ask session_12.pdf "Τι ψηφίστηκε;"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use proceedings_rag::{
    config::ProceedingsConfig, retrieval::RelevanceRanker, server::state::AppState, QaRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Question answering over parliamentary session PDFs
#[derive(Parser, Debug)]
#[command(name = "proceedings-cli")]
#[command(version)]
#[command(about = "Index, search and query parliamentary session PDFs", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', global = true, env = "PROCEEDINGS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build chunk indexes for every session PDF
    Index {
        /// Rebuild indexes that already exist
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show the chunks ranked highest for a query
    Search {
        filename: String,
        query: String,
        /// Number of chunks to show
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
    },

    /// Ask a question about a session
    Ask { filename: String, question: String },

    /// Print a session's summary
    Summary {
        filename: String,
        /// Regenerate instead of using the cached summary
        #[arg(long)]
        refresh: bool,
    },

    /// Print a session's legislative topics
    Topics {
        filename: String,
        /// Regenerate instead of using the cached topics
        #[arg(long)]
        refresh: bool,
    },

    /// List session PDFs
    Sessions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proceedings_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ProceedingsConfig::from_file(path)?,
        None => ProceedingsConfig::default(),
    }
    .with_env_overrides();

    let state = AppState::new(config)?;

    match cli.command {
        Commands::Index { force } => index_all(&state, force).await?,
        Commands::Search { filename, query, top_k } => {
            let k = top_k.unwrap_or(state.config().retrieval.top_k);
            state.indexer().ensure_chunks(&filename).await?;
            let ranker = RelevanceRanker::new(Arc::clone(state.indexer()));

            for scored in ranker.top_k(&filename, &query, k).await? {
                println!(
                    "{} {}",
                    style(format!("#{} (score {})", scored.chunk.index, scored.score))
                        .cyan()
                        .bold(),
                    style(format!("{} chars", scored.chunk.char_len())).dim()
                );
                println!("{}\n", scored.chunk.text);
            }
        }
        Commands::Ask { filename, question } => {
            let request = QaRequest {
                question,
                chat_history: Vec::new(),
            };
            let response = state.qa().answer(&filename, &request).await?;
            if response.cached {
                eprintln!("{}", style("(cached answer)").dim());
            }
            println!("{}", response.answer);
        }
        Commands::Summary { filename, refresh } => {
            let summary = if refresh {
                state.summarizer().regenerate(&filename).await?
            } else {
                state.summarizer().get_or_generate(&filename).await?
            };
            eprintln!("{}", style(format!("generated at {}", summary.generated_at)).dim());
            println!("{}", summary.summary);
        }
        Commands::Topics { filename, refresh } => {
            let topics = if refresh {
                state.topics().regenerate(&filename).await?
            } else {
                state.topics().get_or_generate(&filename).await?
            };
            eprintln!("{}", style(format!("generated at {}", topics.generated_at)).dim());
            println!("{}", topics.topics);
        }
        Commands::Sessions => {
            for filename in state.documents().list().await? {
                println!("{}", filename);
            }
        }
    }

    Ok(())
}

/// Index every session, reporting progress on stderr
async fn index_all(state: &AppState, force: bool) -> anyhow::Result<()> {
    let sessions = state.documents().list().await?;
    if sessions.is_empty() {
        println!("No session PDFs in {}", state.config().storage.documents_dir().display());
        return Ok(());
    }

    let bar = ProgressBar::new(sessions.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )?);

    let mut failed = 0usize;
    for filename in &sessions {
        bar.set_message(filename.clone());
        let result = if force {
            state.qa().reindex(filename).await.map(|_| ())
        } else {
            state.indexer().ensure_chunks(filename).await
        };

        if let Err(e) = result {
            failed += 1;
            bar.println(format!("{} {}: {}", style("failed").red(), filename, e));
        }
        bar.inc(1);
    }
    bar.finish_with_message("done");

    println!(
        "{} {} sessions indexed, {} failed",
        style("✓").green(),
        sessions.len() - failed,
        failed
    );
    Ok(())
}
