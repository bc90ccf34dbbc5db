use sea_orm::*;
use serde_json::json;
use tracing::info;

use crate::entity::occasion;

const FONT_SET: &[&str] = &["Playfair Display", "Dancing Script", "Montserrat", "Pacifico"];

struct OccasionSeed {
    id: &'static str,
    name: &'static str,
    palette: [&'static str; 4],
    motifs: &'static [&'static str],
    tone: &'static str,
}

const DEFAULT_OCCASIONS: &[OccasionSeed] = &[
    OccasionSeed {
        id: "christmas",
        name: "Christmas",
        palette: ["#C8102E", "#006B3C", "#FFFFFF", "#FFD700"],
        motifs: &["snowflakes", "trees", "ornaments", "lights"],
        tone: "festive",
    },
    OccasionSeed {
        id: "new-year",
        name: "New Year",
        palette: ["#FFD700", "#000000", "#FFFFFF", "#FF6B6B"],
        motifs: &["fireworks", "clock", "champagne", "confetti", "countdown"],
        tone: "celebratory",
    },
    OccasionSeed {
        id: "hanukkah",
        name: "Hanukkah",
        palette: ["#0033A0", "#FFFFFF", "#FFD700", "#C8102E"],
        motifs: &["menorah", "dreidel", "stars", "candles", "latkes"],
        tone: "joyful",
    },
    OccasionSeed {
        id: "kwanzaa",
        name: "Kwanzaa",
        palette: ["#000000", "#C8102E", "#006B3C", "#FFD700"],
        motifs: &["kinara", "mkeka", "kente", "unity cup", "fruits"],
        tone: "reflective",
    },
    OccasionSeed {
        id: "winter-solstice",
        name: "Winter Solstice",
        palette: ["#1E3A5F", "#FFFFFF", "#FFD700", "#87CEEB"],
        motifs: &["snow", "ice", "stars", "moon", "evergreen"],
        tone: "peaceful",
    },
];

/// Seed the `occasion` table. Existing rows are left untouched.
pub async fn seed_occasions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now();
    let mut inserted = 0u32;

    for seed in DEFAULT_OCCASIONS {
        let model = occasion::ActiveModel {
            id: Set(seed.id.to_string()),
            name: Set(seed.name.to_string()),
            is_active: Set(true),
            style_guide: Set(json!({
                "color_palette": seed.palette,
                "motifs": seed.motifs,
                "tone": seed.tone,
            })),
            font_set: Set(json!(FONT_SET)),
            created_at: Set(now),
        };

        let result = occasion::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(occasion::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new occasions", inserted);
    }

    Ok(())
}
