use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::CleanupCaller;
use crate::models::cleanup::{CleanupInfoResponse, CleanupResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/cleanup",
    tag = "Cleanup",
    operation_id = "runCleanup",
    summary = "Delete expired cards",
    description = "Removes every card past its expiry together with its cover image. Per-card failures are listed in the result and retried on the next run. Requires `Authorization: Bearer <token>` when `cleanup.auth_token` is set.",
    responses(
        (status = 200, description = "Sweep finished", body = CleanupResponse),
        (status = 401, description = "Missing or wrong token (UNAUTHORIZED)", body = ErrorBody),
        (status = 500, description = "Expired cards could not be listed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security((), ("cleanup_token" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn run_cleanup(
    _caller: CleanupCaller,
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let result = state.sweeper.sweep(Utc::now()).await?;

    info!(
        total_expired = result.total_expired,
        deleted = result.deleted,
        errors = result.errors.len(),
        duration_ms = result.duration_ms,
        "Cleanup completed"
    );

    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/cleanup",
    tag = "Cleanup",
    operation_id = "cleanupInfo",
    summary = "Describe the cleanup endpoint",
    responses(
        (status = 200, description = "Endpoint is reachable", body = CleanupInfoResponse),
    ),
)]
pub async fn cleanup_info() -> Json<CleanupInfoResponse> {
    Json(CleanupInfoResponse {
        message: "Cleanup endpoint is active",
        endpoint: "/api/v1/cleanup",
        method: "POST",
    })
}
