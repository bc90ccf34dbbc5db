use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Caller allowed to trigger a cleanup run.
///
/// When `cleanup.auth_token` is configured the request must carry
/// `Authorization: Bearer <token>`; otherwise every caller is accepted.
pub struct CleanupCaller;

impl FromRequestParts<AppState> for CleanupCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state
            .config
            .cleanup
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            return Ok(CleanupCaller);
        };

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        if token != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(CleanupCaller)
    }
}
