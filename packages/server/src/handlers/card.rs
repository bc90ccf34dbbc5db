use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::client::ClientInfo;
use crate::extractors::json::AppJson;
use crate::models::card::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/cards",
    tag = "Cards",
    operation_id = "createCard",
    summary = "Create a draft card",
    description = "Moderates the message, rewrites it in the requested vibe, generates a cover image and stores a draft. Counts against the per-IP and per-device limits; the remaining budget is returned in `X-RateLimit-*` headers.",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Draft created", body = CardResponse),
        (status = 400, description = "Invalid input or rejected content (VALIDATION_ERROR, CONTENT_REJECTED)", body = ErrorBody),
        (status = 429, description = "Rate limited (RATE_LIMITED)", body = ErrorBody),
        (status = 500, description = "Misconfigured service (CONFIGURATION_ERROR, INTERNAL_ERROR)", body = ErrorBody),
        (status = 503, description = "Generation service overloaded (SERVICE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, client, payload), fields(ip = %client.requester.ip))]
pub async fn create_card(
    State(state): State<AppState>,
    client: ClientInfo,
    AppJson(payload): AppJson<CreateCardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .cards
        .create_card(payload.into(), &client.requester)
        .await?;

    Ok((
        StatusCode::CREATED,
        created.rate_limit.headers(),
        Json(CardResponse::from(created.card)),
    ))
}

#[utoipa::path(
    get,
    path = "/c/{occasion}/{slug}",
    tag = "Cards",
    operation_id = "getCard",
    summary = "View a published card",
    params(
        ("occasion" = String, Path, description = "Occasion id"),
        ("slug" = String, Path, description = "Share token"),
    ),
    responses(
        (status = 200, description = "Published card", body = PublicCardResponse),
        (status = 404, description = "No published card at this link (NOT_FOUND)", body = ErrorBody),
        (status = 410, description = "Card expired (CARD_EXPIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_card(
    State(state): State<AppState>,
    Path((occasion, slug)): Path<(String, String)>,
) -> Result<Json<PublicCardResponse>, AppError> {
    let card = state.cards.get_card(&occasion, &slug).await?;
    Ok(Json(card.into()))
}

#[utoipa::path(
    post,
    path = "/cards/{id}/publish",
    tag = "Cards",
    operation_id = "publishCard",
    summary = "Publish a draft",
    description = "Freezes the card and returns its share link. Publishing twice is an error.",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card published", body = PublishResponse),
        (status = 400, description = "Already published (ALREADY_PUBLISHED)", body = ErrorBody),
        (status = 404, description = "Card not found or expired (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, client))]
pub async fn publish_card(
    State(state): State<AppState>,
    client: ClientInfo,
    Path(id): Path<String>,
) -> Result<Json<PublishResponse>, AppError> {
    let published = state.cards.publish_card(&id, &client.base_url).await?;
    Ok(Json(published.into()))
}

#[utoipa::path(
    post,
    path = "/cards/{id}/regenerate-cover",
    tag = "Cards",
    operation_id = "regenerateCover",
    summary = "Generate a new cover for a draft",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "New cover stored", body = RegenerateCoverResponse),
        (status = 400, description = "Already published (ALREADY_PUBLISHED)", body = ErrorBody),
        (status = 404, description = "Card not found or expired (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Generation service overloaded (SERVICE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn regenerate_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RegenerateCoverResponse>, AppError> {
    let regenerated = state.cards.regenerate_cover(&id).await?;
    Ok(Json(regenerated.into()))
}

#[utoipa::path(
    post,
    path = "/cards/{id}/regenerate-message",
    tag = "Cards",
    operation_id = "regenerateMessage",
    summary = "Rewrite a draft's message again",
    description = "Rewrites from `original_message` when given (moderated first), otherwise from the stored source text.",
    params(("id" = String, Path, description = "Card id")),
    request_body(content = RegenerateMessageRequest, description = "Optional replacement source text"),
    responses(
        (status = 200, description = "Message rewritten", body = RegenerateMessageResponse),
        (status = 400, description = "Already published or rejected content (ALREADY_PUBLISHED, CONTENT_REJECTED)", body = ErrorBody),
        (status = 404, description = "Card not found or expired (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Generation service overloaded (SERVICE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn regenerate_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<AppJson<RegenerateMessageRequest>>,
) -> Result<Json<RegenerateMessageResponse>, AppError> {
    let payload = payload.map(|AppJson(p)| p).unwrap_or_default();
    let regenerated = state
        .cards
        .regenerate_message(&id, payload.original_message.as_deref())
        .await?;
    Ok(Json(regenerated.into()))
}
