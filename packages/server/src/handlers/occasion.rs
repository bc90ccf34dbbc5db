use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::occasion::OccasionResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/occasions",
    tag = "Occasions",
    operation_id = "listOccasions",
    summary = "List active occasions",
    responses(
        (status = 200, description = "Active occasions ordered by name", body = Vec<OccasionResponse>),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_occasions(
    State(state): State<AppState>,
) -> Result<Json<Vec<OccasionResponse>>, AppError> {
    let occasions = state.cards.list_occasions().await?;
    Ok(Json(occasions.into_iter().map(Into::into).collect()))
}
