//! One-shot expiration sweep, for cron.
//!
//! Exits with status 1 when any expired card could not be removed.

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cardsmith::cards::SeaOrmCardRepository;
use cardsmith::config::AppConfig;
use cardsmith::database;
use cardsmith::sweeper::Sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    let store = common::storage::open_store(&config.storage)
        .await
        .context("Failed to open object storage")?;

    let sweeper = Sweeper::new(std::sync::Arc::new(SeaOrmCardRepository::new(db)), store);
    let result = sweeper
        .sweep(Utc::now())
        .await
        .context("Failed to list expired cards")?;

    info!(
        total_expired = result.total_expired,
        deleted = result.deleted,
        errors = result.errors.len(),
        duration_ms = result.duration_ms,
        "Cleanup completed"
    );

    if result.errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    for failure in &result.errors {
        error!(card_id = %failure.card_id, error = %failure.error, "Card not removed");
    }
    Ok(ExitCode::FAILURE)
}
