//! Proceedings server binary
//!
//! Run with: cargo run -p proceedings-rag --bin proceedings-server [config.toml]

use std::path::PathBuf;

use proceedings_rag::{config::ProceedingsConfig, server::ProceedingsServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a TOML configuration file
const CONFIG_ENV: &str = "PROCEEDINGS_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proceedings_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: first argument, then $PROCEEDINGS_CONFIG, then defaults
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => ProceedingsConfig::from_file(path)?,
        None => ProceedingsConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    tracing::info!(
        "Configuration loaded from {}",
        config_path
            .as_ref()
            .map_or("defaults".to_string(), |p| p.display().to_string())
    );
    tracing::info!("  - Media root: {}", config.storage.media_root.display());
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Topic strategy: {:?}", config.topics.strategy);

    if config.llm.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; summaries, topics and answers will fail");
    }

    // Create and start server
    let server = ProceedingsServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  GET  /api/sessions                - List sessions");
    println!("  POST /api/sessions/upload         - Upload a session PDF");
    println!("  POST /api/sessions/:filename/qa   - Ask questions");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
