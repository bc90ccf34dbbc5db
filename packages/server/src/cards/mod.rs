//! Card lifecycle: create, publish, regenerate, view.

mod repository;
mod service;
#[cfg(test)]
pub(crate) mod testing;

pub use repository::{CardRepository, NewCard, PublicCard, SeaOrmCardRepository};
pub use service::{
    CardService, CreateCard, CreatedCard, PublishedCard, RegeneratedCover, RegeneratedMessage,
};

use common::storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::moderation::ModerationReason;
use crate::rate_limit::RateLimitRejection;
use crate::utils::hash::creator_hash;

/// Who is making a request, as far as rate limiting and attribution care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub ip: String,
    pub user_agent: String,
}

impl Requester {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Device fingerprint; doubles as the card's `creator_hash`.
    pub fn device_hash(&self) -> String {
        creator_hash(&self.ip, &self.user_agent)
    }
}

#[derive(Debug, Error)]
pub enum CardError {
    #[error("{0}")]
    Validation(String),
    #[error("rate limited on {}", .0.dimension.as_str())]
    RateLimited(RateLimitRejection),
    #[error("message rejected: {0}")]
    ContentRejected(ModerationReason),
    #[error("message blocked by the text model")]
    UpstreamContentBlocked,
    #[error("generation service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("storage misconfigured: {0}")]
    StorageMisconfigured(String),
    #[error("storage access denied: {0}")]
    StorageAccessDenied(String),
    #[error("generation misconfigured: {0}")]
    GenerationMisconfigured(String),
    #[error("card not found")]
    NotFound,
    #[error("cannot modify published card")]
    AlreadyPublished,
    #[error("card expired")]
    Expired,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("{0}")]
    Internal(String),
}

impl CardError {
    /// Categorize a failed generation call.
    pub(crate) fn from_generation(err: GenerationError, what: &str) -> Self {
        if matches!(err, GenerationError::ContentBlocked) {
            return Self::UpstreamContentBlocked;
        }
        if err.is_unavailable() {
            return Self::UpstreamUnavailable(err.to_string());
        }
        if matches!(err, GenerationError::Configuration(_)) || err.is_auth_failure() {
            return Self::GenerationMisconfigured(err.to_string());
        }
        if let GenerationError::Exhausted { last, .. } = &err
            && last.is_auth_failure()
        {
            return Self::GenerationMisconfigured(err.to_string());
        }
        Self::Internal(format!("{what} failed: {err}"))
    }
}

impl From<StorageError> for CardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Misconfigured(msg) => Self::StorageMisconfigured(msg),
            StorageError::AccessDenied(msg) => Self::StorageAccessDenied(msg),
            other => Self::Internal(format!("cover upload failed: {other}")),
        }
    }
}
