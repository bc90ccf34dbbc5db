use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A holiday a card can be made for. Reference data, seeded at startup.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "occasion")]
pub struct Model {
    /// Stable slug used in URLs, e.g. "christmas".
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(default_value = true, indexed)]
    pub is_active: bool,

    /// Palettes, motifs and tone: `{palettes: [...], motifs: [...], tone: "..."}`
    #[sea_orm(column_type = "JsonBinary")]
    pub style_guide: serde_json::Value,

    /// Font families offered for this occasion, as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub font_set: serde_json::Value,

    #[sea_orm(has_many)]
    pub cards: HasMany<super::card::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
