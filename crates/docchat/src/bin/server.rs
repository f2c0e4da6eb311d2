//! Document QA server binary
//!
//! Run with: cargo run -p docchat --bin docchat-server

use docchat::{config::AppConfig, server::DocchatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (docchat.toml if present, defaults otherwise)
    let config_path = std::path::Path::new("docchat.toml");
    let config = AppConfig::load(config_path.exists().then_some(config_path))?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Docs directory: {}", config.storage.docs_directory.display());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Retrieval top-k: {}", config.retrieval.top_k);

    // Check the vector store is reachable
    tracing::info!("Checking Chroma at {}...", config.vector_db.base_url);
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/v1/heartbeat", config.vector_db.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Chroma is running");
        }
        _ => {
            tracing::warn!("Chroma not available at {}", config.vector_db.base_url);
            tracing::warn!("Start it with: chroma run --path ./chroma-data --port 8001");
        }
    }

    let server = DocchatServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST   /api/upload    - Upload documents");
    println!("  POST   /api/query     - Ask questions");
    println!("  POST   /api/math      - Evaluate math expressions");
    println!("  GET    /api/documents - List documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
