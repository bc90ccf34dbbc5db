use std::sync::Arc;

use common::storage::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::cards::{CardService, SeaOrmCardRepository};
use crate::config::AppConfig;
use crate::generation::{ImageGenerator, TextGenerator};
use crate::rate_limit::RateLimiter;
use crate::sweeper::Sweeper;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub cards: CardService,
    pub sweeper: Sweeper,
}

impl AppState {
    /// Wire the card service and sweeper over one repository and store.
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        store: Arc<dyn ObjectStore>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
    ) -> Self {
        let repo = Arc::new(SeaOrmCardRepository::new(db.clone()));
        let limiter = RateLimiter::from_config(&config.rate_limit);
        let cards = CardService::new(
            repo.clone(),
            store.clone(),
            text,
            images,
            limiter,
            &config.card,
        );
        let sweeper = Sweeper::new(repo, store);

        Self {
            config: Arc::new(config),
            db,
            cards,
            sweeper,
        }
    }
}
