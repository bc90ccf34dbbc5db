use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CardStatus, Vibe};
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{card, occasion};

/// Fields of a card about to be inserted. New cards are always drafts.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub id: String,
    pub slug: String,
    pub occasion_id: String,
    pub vibe: Vibe,
    pub clean_message: String,
    pub source_message: String,
    pub cover_image_url: String,
    pub theme_version: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub creator_hash: String,
}

/// A card looked up by its share link, with the occasion's display name.
#[derive(Debug, Clone)]
pub struct PublicCard {
    pub card: card::Model,
    pub occasion_name: String,
}

/// Persistence for cards and their occasions.
///
/// Every update is conditional on the card still being a draft; the returned
/// flag says whether a row changed.
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn find_occasion(&self, id: &str) -> Result<Option<occasion::Model>, DbErr>;

    /// Active occasions ordered by name.
    async fn list_active_occasions(&self) -> Result<Vec<occasion::Model>, DbErr>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr>;

    async fn insert_card(&self, card: NewCard) -> Result<card::Model, DbErr>;

    async fn find_card(&self, id: &str) -> Result<Option<card::Model>, DbErr>;

    async fn find_by_slug(&self, occasion_id: &str, slug: &str)
    -> Result<Option<PublicCard>, DbErr>;

    async fn update_cover(&self, id: &str, cover_image_url: &str) -> Result<bool, DbErr>;

    async fn update_message(
        &self,
        id: &str,
        clean_message: &str,
        source_message: &str,
    ) -> Result<bool, DbErr>;

    /// `draft -> published`. Returns `false` if the card is missing or already published.
    async fn mark_published(&self, id: &str) -> Result<bool, DbErr>;

    async fn delete_card(&self, id: &str) -> Result<bool, DbErr>;

    /// Cards whose `expires_at` is strictly before `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<card::Model>, DbErr>;
}

#[derive(Clone)]
pub struct SeaOrmCardRepository {
    db: DatabaseConnection,
}

impl SeaOrmCardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn update_draft() -> UpdateMany<card::Entity> {
        card::Entity::update_many().filter(card::Column::Status.eq(CardStatus::Draft))
    }
}

#[async_trait]
impl CardRepository for SeaOrmCardRepository {
    async fn find_occasion(&self, id: &str) -> Result<Option<occasion::Model>, DbErr> {
        occasion::Entity::find_by_id(id.to_string()).one(&self.db).await
    }

    async fn list_active_occasions(&self) -> Result<Vec<occasion::Model>, DbErr> {
        occasion::Entity::find()
            .filter(occasion::Column::IsActive.eq(true))
            .order_by_asc(occasion::Column::Name)
            .all(&self.db)
            .await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = card::Entity::find()
            .filter(card::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn insert_card(&self, new: NewCard) -> Result<card::Model, DbErr> {
        let model = card::ActiveModel {
            id: Set(new.id),
            slug: Set(new.slug),
            occasion_id: Set(new.occasion_id),
            vibe: Set(new.vibe),
            clean_message: Set(new.clean_message),
            source_message: Set(new.source_message),
            cover_image_url: Set(new.cover_image_url),
            theme_version: Set(new.theme_version),
            status: Set(CardStatus::Draft),
            created_at: Set(new.created_at),
            expires_at: Set(new.expires_at),
            creator_hash: Set(new.creator_hash),
        };
        model.insert(&self.db).await
    }

    async fn find_card(&self, id: &str) -> Result<Option<card::Model>, DbErr> {
        card::Entity::find_by_id(id.to_string()).one(&self.db).await
    }

    async fn find_by_slug(
        &self,
        occasion_id: &str,
        slug: &str,
    ) -> Result<Option<PublicCard>, DbErr> {
        let found = card::Entity::find()
            .filter(card::Column::OccasionId.eq(occasion_id))
            .filter(card::Column::Slug.eq(slug))
            .find_also_related(occasion::Entity)
            .one(&self.db)
            .await?;

        Ok(found.map(|(card, occasion)| PublicCard {
            occasion_name: occasion
                .map(|o| o.name)
                .unwrap_or_else(|| card.occasion_id.clone()),
            card,
        }))
    }

    async fn update_cover(&self, id: &str, cover_image_url: &str) -> Result<bool, DbErr> {
        let result = Self::update_draft()
            .col_expr(card::Column::CoverImageUrl, Expr::value(cover_image_url))
            .filter(card::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn update_message(
        &self,
        id: &str,
        clean_message: &str,
        source_message: &str,
    ) -> Result<bool, DbErr> {
        let result = Self::update_draft()
            .col_expr(card::Column::CleanMessage, Expr::value(clean_message))
            .col_expr(card::Column::SourceMessage, Expr::value(source_message))
            .filter(card::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_published(&self, id: &str) -> Result<bool, DbErr> {
        let result = Self::update_draft()
            .col_expr(card::Column::Status, Expr::value(CardStatus::Published))
            .filter(card::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_card(&self, id: &str) -> Result<bool, DbErr> {
        let result = card::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<card::Model>, DbErr> {
        card::Entity::find()
            .filter(card::Column::ExpiresAt.lt(now))
            .order_by_asc(card::Column::ExpiresAt)
            .all(&self.db)
            .await
    }
}
