#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotional tone chosen for a card. Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "warm"))]
    Warm,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "funny"))]
    Funny,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "fancy"))]
    Fancy,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "chaotic"))]
    Chaotic,
}

impl Vibe {
    pub const ALL: &'static [Vibe] = &[Self::Warm, Self::Funny, Self::Fancy, Self::Chaotic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Funny => "funny",
            Self::Fancy => "fancy",
            Self::Chaotic => "chaotic",
        }
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown vibe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVibeError {
    invalid: String,
}

impl fmt::Display for ParseVibeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid vibe '{}'. Must be one of: {}",
            self.invalid,
            Vibe::ALL
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseVibeError {}

impl FromStr for Vibe {
    type Err = ParseVibeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warm" => Ok(Self::Warm),
            "funny" => Ok(Self::Funny),
            "fancy" => Ok(Self::Fancy),
            "chaotic" => Ok(Self::Chaotic),
            _ => Err(ParseVibeError {
                invalid: s.to_string(),
            }),
        }
    }
}
