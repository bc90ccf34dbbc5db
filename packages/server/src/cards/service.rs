use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::storage::{COVER_CONTENT_TYPE, ObjectStore, cover_key};
use common::{CardStatus, Vibe};
use tracing::{info, instrument, warn};

use super::repository::{CardRepository, NewCard, PublicCard};
use super::{CardError, Requester};
use crate::config::CardConfig;
use crate::entity::{card, occasion};
use crate::generation::{ImageGenerator, TextGenerator};
use crate::moderation::{HeuristicModerator, Moderator};
use crate::rate_limit::{RateLimitPass, RateLimiter};
use crate::utils::cover_key::key_from_url;
use crate::utils::slug::generate_slug;

const SLUG_ATTEMPTS: usize = 5;
const THEME_VERSION: &str = "1.0";

/// Raw create request. Empty strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct CreateCard {
    pub occasion: String,
    pub vibe: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CreatedCard {
    pub card: card::Model,
    pub rate_limit: RateLimitPass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCard {
    pub id: String,
    pub slug: String,
    pub deep_link: String,
    pub status: CardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegeneratedCover {
    pub cover_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegeneratedMessage {
    pub clean_message: String,
}

/// Orchestrates validation, rate limiting, moderation, generation and
/// persistence for every card operation.
#[derive(Clone)]
pub struct CardService {
    repo: Arc<dyn CardRepository>,
    store: Arc<dyn ObjectStore>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    moderator: Arc<dyn Moderator>,
    limiter: RateLimiter,
    retention: Duration,
}

impl CardService {
    pub fn new(
        repo: Arc<dyn CardRepository>,
        store: Arc<dyn ObjectStore>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        limiter: RateLimiter,
        config: &CardConfig,
    ) -> Self {
        Self {
            repo,
            store,
            text,
            images,
            moderator: Arc::new(HeuristicModerator),
            limiter,
            retention: Duration::try_days(config.expiration_days).unwrap_or(Duration::MAX),
        }
    }

    pub fn with_moderator(mut self, moderator: Arc<dyn Moderator>) -> Self {
        self.moderator = moderator;
        self
    }

    /// `None` when the retention is not positive or overflows the calendar.
    fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.retention)
            .filter(|expires_at| *expires_at > now)
    }

    pub async fn list_occasions(&self) -> Result<Vec<occasion::Model>, CardError> {
        Ok(self.repo.list_active_occasions().await?)
    }

    #[instrument(skip(self, input, requester), fields(occasion = %input.occasion, vibe = %input.vibe))]
    pub async fn create_card(
        &self,
        input: CreateCard,
        requester: &Requester,
    ) -> Result<CreatedCard, CardError> {
        let (occasion_id, vibe, message) = validate_create(&input)?;

        let occasion = self
            .repo
            .find_occasion(occasion_id)
            .await?
            .filter(|o| o.is_active)
            .ok_or_else(|| CardError::Validation(format!("Unknown occasion: {occasion_id}")))?;

        let device_hash = requester.device_hash();
        let rate_limit = self
            .limiter
            .check_request(&requester.ip, &device_hash)
            .await
            .map_err(|rejection| {
                info!(
                    dimension = rejection.dimension.as_str(),
                    "Card creation rate limited"
                );
                CardError::RateLimited(rejection)
            })?;

        let verdict = self.moderator.classify(message);
        if let Some(reason) = verdict.reason.filter(|_| !verdict.allowed) {
            info!(reason = reason.as_str(), "Message rejected by moderation");
            return Err(CardError::ContentRejected(reason));
        }
        let source_message = verdict.cleaned;

        let clean_message = self
            .text
            .rewrite_text(&source_message, vibe, &occasion.name)
            .await
            .map_err(|e| CardError::from_generation(e, "message rewrite"))?;

        let card_id = uuid::Uuid::new_v4().to_string();
        let cover_image_url = self
            .upload_cover(&card_id, 1, vibe, &occasion.name)
            .await?;

        let slug = match self.unique_slug().await {
            Ok(slug) => slug,
            Err(e) => {
                self.discard_cover(&cover_image_url).await;
                return Err(e);
            }
        };

        let now = Utc::now();
        let Some(expires_at) = self.expires_at(now) else {
            self.discard_cover(&cover_image_url).await;
            return Err(CardError::Internal(format!(
                "retention of {} cannot produce a future expiry",
                self.retention
            )));
        };
        let new_card = NewCard {
            id: card_id,
            slug,
            occasion_id: occasion.id,
            vibe,
            clean_message,
            source_message,
            cover_image_url: cover_image_url.clone(),
            theme_version: THEME_VERSION.into(),
            created_at: now,
            expires_at,
            creator_hash: device_hash,
        };

        let card = match self.repo.insert_card(new_card).await {
            Ok(card) => card,
            Err(e) => {
                self.discard_cover(&cover_image_url).await;
                return Err(e.into());
            }
        };

        info!(card_id = %card.id, slug = %card.slug, "Card created");
        Ok(CreatedCard { card, rate_limit })
    }

    /// Publish a draft and build its share link under `base_url`.
    #[instrument(skip(self))]
    pub async fn publish_card(&self, id: &str, base_url: &str) -> Result<PublishedCard, CardError> {
        let card = self.load_draft(id).await?;

        if !self.repo.mark_published(id).await? {
            return Err(CardError::AlreadyPublished);
        }

        let deep_link = format!(
            "{}/c/{}/{}",
            base_url.trim_end_matches('/'),
            card.occasion_id,
            card.slug
        );
        info!(card_id = %card.id, "Card published");

        Ok(PublishedCard {
            id: card.id,
            slug: card.slug,
            deep_link,
            status: CardStatus::Published,
        })
    }

    #[instrument(skip(self))]
    pub async fn regenerate_cover(&self, id: &str) -> Result<RegeneratedCover, CardError> {
        let card = self.load_draft(id).await?;
        let occasion_name = self.occasion_name(&card.occasion_id).await?;

        let version = Utc::now().timestamp_millis();
        let cover_image_url = self
            .upload_cover(&card.id, version, card.vibe, &occasion_name)
            .await?;

        if !self.repo.update_cover(&card.id, &cover_image_url).await? {
            self.discard_cover(&cover_image_url).await;
            return Err(CardError::AlreadyPublished);
        }

        if card.cover_image_url != cover_image_url {
            self.discard_cover(&card.cover_image_url).await;
        }

        info!(card_id = %card.id, "Cover regenerated");
        Ok(RegeneratedCover { cover_image_url })
    }

    /// Rewrite the message again, from `original_message` if given (moderated
    /// first) or from the stored source text.
    #[instrument(skip(self, original_message))]
    pub async fn regenerate_message(
        &self,
        id: &str,
        original_message: Option<&str>,
    ) -> Result<RegeneratedMessage, CardError> {
        let card = self.load_draft(id).await?;

        let source_message = match original_message.filter(|m| !m.trim().is_empty()) {
            Some(original) => {
                let verdict = self.moderator.classify(original);
                if let Some(reason) = verdict.reason.filter(|_| !verdict.allowed) {
                    return Err(CardError::ContentRejected(reason));
                }
                verdict.cleaned
            }
            None => card.source_message.clone(),
        };

        let occasion_name = self.occasion_name(&card.occasion_id).await?;
        let clean_message = self
            .text
            .rewrite_text(&source_message, card.vibe, &occasion_name)
            .await
            .map_err(|e| CardError::from_generation(e, "message rewrite"))?;

        if !self
            .repo
            .update_message(&card.id, &clean_message, &source_message)
            .await?
        {
            return Err(CardError::AlreadyPublished);
        }

        info!(card_id = %card.id, "Message regenerated");
        Ok(RegeneratedMessage { clean_message })
    }

    /// Public view by share link. Drafts are invisible.
    pub async fn get_card(&self, occasion_id: &str, slug: &str) -> Result<PublicCard, CardError> {
        let found = self
            .repo
            .find_by_slug(occasion_id, slug)
            .await?
            .filter(|c| c.card.status == CardStatus::Published)
            .ok_or(CardError::NotFound)?;

        if found.card.is_expired(Utc::now()) {
            return Err(CardError::Expired);
        }
        Ok(found)
    }

    /// Existing, unexpired draft.
    async fn load_draft(&self, id: &str) -> Result<card::Model, CardError> {
        let card = self
            .repo
            .find_card(id)
            .await?
            .filter(|c| !c.is_expired(Utc::now()))
            .ok_or(CardError::NotFound)?;

        if !card.status.is_mutable() {
            return Err(CardError::AlreadyPublished);
        }
        Ok(card)
    }

    async fn occasion_name(&self, occasion_id: &str) -> Result<String, CardError> {
        Ok(self
            .repo
            .find_occasion(occasion_id)
            .await?
            .map(|o| o.name)
            .unwrap_or_else(|| occasion_id.to_string()))
    }

    async fn upload_cover(
        &self,
        card_id: &str,
        version: i64,
        vibe: Vibe,
        occasion_name: &str,
    ) -> Result<String, CardError> {
        let bytes = self
            .images
            .generate_image(vibe, occasion_name)
            .await
            .map_err(|e| CardError::from_generation(e, "cover generation"))?;

        let key = cover_key(card_id, version);
        let url = self.store.put(&key, bytes, COVER_CONTENT_TYPE).await?;
        Ok(url)
    }

    /// Best-effort removal of an uploaded cover.
    async fn discard_cover(&self, url: &str) {
        let Some(key) = key_from_url(url) else {
            return;
        };
        if let Err(e) = self.store.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to delete cover object");
        }
    }

    async fn unique_slug(&self) -> Result<String, CardError> {
        for _ in 0..SLUG_ATTEMPTS {
            let slug = generate_slug();
            if !self.repo.slug_exists(&slug).await? {
                return Ok(slug);
            }
            warn!(slug = %slug, "Slug collision, retrying");
        }
        Err(CardError::Internal(format!(
            "no unique slug after {SLUG_ATTEMPTS} attempts"
        )))
    }
}

fn validate_create(input: &CreateCard) -> Result<(&str, Vibe, &str), CardError> {
    let occasion = input.occasion.trim();
    let vibe = input.vibe.trim();
    if occasion.is_empty() || vibe.is_empty() || input.message.trim().is_empty() {
        return Err(CardError::Validation(
            "Missing required fields: occasion, vibe, message".into(),
        ));
    }
    let vibe = Vibe::from_str(vibe).map_err(|_| {
        CardError::Validation("Invalid vibe. Must be one of: warm, funny, fancy, chaotic".into())
    })?;
    Ok((occasion, vibe, &input.message))
}
