use chrono::{DateTime, Utc};
use common::{CardStatus, Vibe};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cards::{CreateCard, PublicCard, PublishedCard, RegeneratedCover, RegeneratedMessage};
use crate::entity::card;

/// Fields are optional so a missing one is reported as a validation error
/// rather than a deserialization failure.
#[derive(Deserialize, ToSchema)]
pub struct CreateCardRequest {
    /// Occasion id, e.g. `christmas`.
    #[schema(example = "christmas")]
    pub occasion: Option<String>,
    /// One of `warm`, `funny`, `fancy`, `chaotic`.
    #[schema(example = "warm")]
    pub vibe: Option<String>,
    /// Free text to rewrite. 3 to 5000 characters after PII removal.
    #[schema(example = "Happy holidays!")]
    pub message: Option<String>,
}

impl From<CreateCardRequest> for CreateCard {
    fn from(req: CreateCardRequest) -> Self {
        CreateCard {
            occasion: req.occasion.unwrap_or_default(),
            vibe: req.vibe.unwrap_or_default(),
            message: req.message.unwrap_or_default(),
        }
    }
}

/// A card as seen by its creator.
#[derive(Serialize, ToSchema)]
pub struct CardResponse {
    pub id: String,
    #[schema(example = "a9F3kP")]
    pub slug: String,
    #[schema(example = "christmas")]
    pub occasion: String,
    pub vibe: Vibe,
    pub clean_message: String,
    pub cover_image_url: String,
    pub status: CardStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<card::Model> for CardResponse {
    fn from(m: card::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            occasion: m.occasion_id,
            vibe: m.vibe,
            clean_message: m.clean_message,
            cover_image_url: m.cover_image_url,
            status: m.status,
            created_at: m.created_at,
            expires_at: m.expires_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PublishResponse {
    pub id: String,
    pub slug: String,
    /// `{base_url}/c/{occasion}/{slug}`
    #[schema(example = "https://cards.example.com/c/christmas/a9F3kP")]
    pub deep_link: String,
    pub status: CardStatus,
}

impl From<PublishedCard> for PublishResponse {
    fn from(p: PublishedCard) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            deep_link: p.deep_link,
            status: p.status,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RegenerateCoverResponse {
    pub cover_image_url: String,
}

impl From<RegeneratedCover> for RegenerateCoverResponse {
    fn from(r: RegeneratedCover) -> Self {
        Self {
            cover_image_url: r.cover_image_url,
        }
    }
}

#[derive(Deserialize, ToSchema, Default)]
pub struct RegenerateMessageRequest {
    /// Replacement source text. Omit to rewrite the stored source again.
    pub original_message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegenerateMessageResponse {
    pub clean_message: String,
}

impl From<RegeneratedMessage> for RegenerateMessageResponse {
    fn from(r: RegeneratedMessage) -> Self {
        Self {
            clean_message: r.clean_message,
        }
    }
}

/// A published card as seen by anyone holding the link.
#[derive(Serialize, ToSchema)]
pub struct PublicCardResponse {
    pub slug: String,
    pub occasion: String,
    #[schema(example = "Christmas")]
    pub occasion_name: String,
    pub vibe: Vibe,
    pub clean_message: String,
    pub cover_image_url: String,
    pub theme_version: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<PublicCard> for PublicCardResponse {
    fn from(p: PublicCard) -> Self {
        let card = p.card;
        Self {
            slug: card.slug,
            occasion: card.occasion_id,
            occasion_name: p.occasion_name,
            vibe: card.vibe,
            clean_message: card.clean_message,
            cover_image_url: card.cover_image_url,
            theme_version: card.theme_version,
            created_at: card.created_at,
            expires_at: card.expires_at,
        }
    }
}
