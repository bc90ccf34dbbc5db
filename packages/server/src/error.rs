use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::cards::CardError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `RATE_LIMITED`,
    /// `CONTENT_REJECTED`, `SERVICE_UNAVAILABLE`, `CONFIGURATION_ERROR`,
    /// `NOT_FOUND`, `ALREADY_PUBLISHED`, `CARD_EXPIRED`, `UNAUTHORIZED`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing required fields: occasion, vibe, message")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Rate limit exceeded. Carries seconds until retry and the `X-RateLimit-*` headers.
    RateLimited {
        retry_after: u64,
        message: String,
        headers: HeaderMap,
    },
    ContentRejected(String),
    ServiceUnavailable(String),
    /// Operator-side misconfiguration. Detail is logged, never returned.
    Configuration(String),
    NotFound(String),
    AlreadyPublished(String),
    Expired,
    Unauthorized,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::RateLimited { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "RATE_LIMITED",
                    message,
                },
            ),
            AppError::ContentRejected(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "CONTENT_REJECTED",
                    message: msg,
                },
            ),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    code: "SERVICE_UNAVAILABLE",
                    message: msg,
                },
            ),
            AppError::Configuration(detail) => {
                tracing::error!("Configuration error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "CONFIGURATION_ERROR",
                        message: "The service is not configured correctly. Please try again later."
                            .into(),
                    },
                )
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::AlreadyPublished(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "ALREADY_PUBLISHED",
                    message: msg,
                },
            ),
            AppError::Expired => (
                StatusCode::GONE,
                ErrorBody {
                    code: "CARD_EXPIRED",
                    message: "This card has expired".into(),
                },
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "UNAUTHORIZED",
                    message: "Unauthorized".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rate_limit = if let AppError::RateLimited {
            retry_after,
            headers,
            ..
        } = &self
        {
            Some((*retry_after, headers.clone()))
        } else {
            None
        };

        let (status, body) = self.status_and_body();

        if let Some((seconds, headers)) = rate_limit {
            (
                status,
                headers,
                [("Retry-After", seconds.to_string())],
                Json(body),
            )
                .into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<CardError> for AppError {
    fn from(err: CardError) -> Self {
        match err {
            CardError::Validation(msg) => AppError::Validation(msg),
            CardError::RateLimited(rejection) => AppError::RateLimited {
                retry_after: rejection.retry_after_secs(chrono::Utc::now()),
                message: rejection.message(),
                headers: rejection.headers(),
            },
            CardError::ContentRejected(reason) => {
                AppError::ContentRejected(reason.user_message().into())
            }
            CardError::UpstreamContentBlocked => AppError::ContentRejected(
                "Your message could not be processed. Please revise and try again.".into(),
            ),
            CardError::UpstreamUnavailable(detail) => {
                tracing::warn!("Upstream unavailable: {}", detail);
                AppError::ServiceUnavailable(
                    "AI service is temporarily overloaded. Please try again in a few moments."
                        .into(),
                )
            }
            CardError::StorageMisconfigured(detail)
            | CardError::StorageAccessDenied(detail)
            | CardError::GenerationMisconfigured(detail) => AppError::Configuration(detail),
            CardError::NotFound => AppError::NotFound("Card not found".into()),
            CardError::AlreadyPublished => {
                AppError::AlreadyPublished("Cannot modify published card".into())
            }
            CardError::Expired => AppError::Expired,
            CardError::Database(e) => AppError::Internal(e.to_string()),
            CardError::Internal(detail) => AppError::Internal(detail),
        }
    }
}
