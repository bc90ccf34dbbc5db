use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cardsmith::config::AppConfig;
use cardsmith::generation::{GeminiClient, RetryingGenerator};
use cardsmith::state::AppState;
use cardsmith::sweeper::run_sweeper;
use cardsmith::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::seed_occasions(&db)
        .await
        .context("Failed to seed occasions")?;

    let store = common::storage::open_store(&config.storage)
        .await
        .context("Failed to open object storage")?;

    let gemini = GeminiClient::new(&config.generation).context("Failed to build Gemini client")?;
    let generator = Arc::new(RetryingGenerator::new(
        gemini,
        config.generation.retry.clone(),
    ));
    if config.generation.api_key.is_none() {
        tracing::warn!("generation.api_key is not set; card creation will fail until it is");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_every = config.cleanup.interval_secs;

    let state = AppState::new(config, db, store, generator.clone(), generator);

    if sweep_every > 0 {
        tokio::spawn(run_sweeper(
            state.sweeper.clone(),
            Duration::from_secs(sweep_every),
        ));
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
