use common::{CardStatus, Vibe};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "card")]
pub struct Model {
    /// UUID v4 string.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// 6-character public token used in share links.
    #[sea_orm(unique)]
    pub slug: String,

    pub occasion_id: String,
    #[sea_orm(belongs_to, from = "occasion_id", to = "id")]
    pub occasion: HasOne<super::occasion::Entity>,

    pub vibe: Vibe,

    /// AI-rewritten message shown on the card.
    #[sea_orm(column_type = "Text")]
    pub clean_message: String,

    /// Moderated input the rewrite was produced from.
    #[sea_orm(column_type = "Text")]
    pub source_message: String,

    #[sea_orm(column_type = "Text")]
    pub cover_image_url: String,

    pub theme_version: String,

    #[sea_orm(indexed)]
    pub status: CardStatus,

    pub created_at: DateTimeUtc,

    #[sea_orm(indexed)]
    pub expires_at: DateTimeUtc,

    /// First 16 hex chars of SHA-256("{ip}:{user_agent}").
    #[sea_orm(indexed)]
    pub creator_hash: String,
}

impl Model {
    /// Same boundary as the sweeper: a card is live through `expires_at` itself.
    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires_at < now
    }
}

impl ActiveModelBehavior for ActiveModel {}
