use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::storage::ObjectStore;
use sea_orm::DbErr;
use tracing::{error, info, warn};

use crate::cards::CardRepository;
use crate::entity::card;
use crate::utils::cover_key::key_from_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub card_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupResult {
    pub total_expired: usize,
    pub deleted: usize,
    pub errors: Vec<CleanupFailure>,
    pub duration_ms: u64,
}

/// Deletes expired cards and their cover objects.
#[derive(Clone)]
pub struct Sweeper {
    repo: Arc<dyn CardRepository>,
    store: Arc<dyn ObjectStore>,
}

impl Sweeper {
    pub fn new(repo: Arc<dyn CardRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// Remove every card with `expires_at < now`.
    ///
    /// Only the initial query can fail the sweep. Per-card failures are
    /// collected in `errors` and the row is left for the next run.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<CleanupResult, DbErr> {
        let started = Instant::now();
        let expired = self.repo.find_expired(now).await?;

        let mut result = CleanupResult {
            total_expired: expired.len(),
            ..Default::default()
        };

        if !expired.is_empty() {
            info!(count = expired.len(), "Found expired cards to clean up");
        }

        for card in expired {
            match self.remove_card(&card).await {
                Ok(true) => {
                    result.deleted += 1;
                    info!(card_id = %card.id, slug = %card.slug, "Deleted expired card");
                }
                Ok(false) => {
                    info!(card_id = %card.id, "Expired card already removed");
                }
                Err(e) => {
                    error!(card_id = %card.id, error = %e, "Failed to delete expired card");
                    result.errors.push(CleanupFailure {
                        card_id: card.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// `Ok(false)` when the row was already gone.
    async fn remove_card(&self, card: &card::Model) -> Result<bool, DbErr> {
        // The object may already be gone; a failed delete must not keep the row alive.
        if let Some(key) = key_from_url(&card.cover_image_url)
            && let Err(e) = self.store.delete(&key).await
        {
            warn!(card_id = %card.id, key = %key, error = %e, "Failed to delete cover object");
        }

        self.repo.delete_card(&card.id).await
    }
}

/// Run the sweeper as a background task.
pub async fn run_sweeper(sweeper: Sweeper, every: Duration) {
    info!(interval_secs = every.as_secs(), "Starting expiration sweeper");

    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match sweeper.sweep(Utc::now()).await {
            Ok(result) if result.total_expired > 0 => info!(
                total_expired = result.total_expired,
                deleted = result.deleted,
                errors = result.errors.len(),
                duration_ms = result.duration_ms,
                "Expiration sweep finished"
            ),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Expiration sweep failed"),
        }
    }
}
