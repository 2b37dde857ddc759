//! diary-server - Photo-to-journal conversation service
//!
//! Captions an uploaded photo, runs an emotion-aware Q&A loop about it,
//! drafts a diary entry from the conversation, and recommends a song
//! matching the diary's emotion.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use diary_server::catalog::SongCatalog;
use diary_server::config::{Args, ServerConfig};
use diary_server::oracles::{EmbeddingClient, EmotionClassifierClient, GeminiClient};
use diary_server::service::DiaryService;
use diary_server::session::SessionRegistry;
use diary_server::storage::DiaryStore;
use diary_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Deep Diary server (diary-server) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = ServerConfig::resolve(args)?;

    let catalog = match SongCatalog::load(&config.catalog_path) {
        Ok(catalog) => {
            info!(
                "✓ Loaded song catalog: {} songs from {}",
                catalog.len(),
                config.catalog_path.display()
            );
            Arc::new(catalog)
        }
        Err(e) => {
            error!(
                "Failed to load song catalog from {}: {}",
                config.catalog_path.display(),
                e
            );
            return Err(e.into());
        }
    };

    let store = Arc::new(DiaryStore::new(&config.diary_dir)?);
    info!("Diary directory: {}", config.diary_dir.display());

    let gemini = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )?);
    let emotion_client = Arc::new(EmotionClassifierClient::new(
        config.emotion_service_url.clone(),
    )?);
    let embedding_client = Arc::new(EmbeddingClient::new(config.embedding_service_url.clone())?);
    info!(
        "Oracle endpoints: gemini model {}, emotion {}, embedding {}",
        config.gemini_model, config.emotion_service_url, config.embedding_service_url
    );

    let service = Arc::new(DiaryService::new(
        gemini.clone(),
        emotion_client,
        gemini,
        embedding_client,
        catalog,
    ));

    let registry = Arc::new(SessionRegistry::new(
        config.session_ttl,
        config.session_capacity,
    ));

    let fetch_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let state = AppState::new(service, registry, store, fetch_client);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("diary-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
