use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::occasion;

#[derive(Serialize, ToSchema)]
pub struct OccasionResponse {
    #[schema(example = "christmas")]
    pub id: String,
    #[schema(example = "Christmas")]
    pub name: String,
    /// `{color_palette, motifs, tone}`
    #[schema(value_type = Object)]
    pub style_guide: serde_json::Value,
    #[schema(value_type = Vec<String>)]
    pub font_set: serde_json::Value,
}

impl From<occasion::Model> for OccasionResponse {
    fn from(m: occasion::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            style_guide: m.style_guide,
            font_set: m.font_set,
        }
    }
}
