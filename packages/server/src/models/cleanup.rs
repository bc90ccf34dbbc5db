use serde::Serialize;
use utoipa::ToSchema;

use crate::sweeper::{CleanupFailure, CleanupResult};

#[derive(Serialize, ToSchema)]
pub struct CleanupErrorDetail {
    pub card_id: String,
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct CleanupSummary {
    pub total_expired: usize,
    pub deleted: usize,
    /// Number of cards that could not be removed this run.
    pub errors: usize,
    pub error_details: Vec<CleanupErrorDetail>,
    pub duration_ms: u64,
}

#[derive(Serialize, ToSchema)]
pub struct CleanupResponse {
    pub success: bool,
    pub result: CleanupSummary,
}

impl From<CleanupResult> for CleanupResponse {
    fn from(r: CleanupResult) -> Self {
        Self {
            success: true,
            result: CleanupSummary {
                total_expired: r.total_expired,
                deleted: r.deleted,
                errors: r.errors.len(),
                error_details: r
                    .errors
                    .into_iter()
                    .map(|CleanupFailure { card_id, error }| CleanupErrorDetail { card_id, error })
                    .collect(),
                duration_ms: r.duration_ms,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CleanupInfoResponse {
    #[schema(example = "Cleanup endpoint is active")]
    pub message: &'static str,
    #[schema(example = "/api/v1/cleanup")]
    pub endpoint: &'static str,
    #[schema(example = "POST")]
    pub method: &'static str,
}
