//! Text rewrite and cover image generation.

mod gemini;
mod prompt;
mod retry;

pub use gemini::GeminiClient;
pub use prompt::{clean_text_output, decode_image_payload, image_prompt, text_prompt};
pub use retry::RetryingGenerator;

use async_trait::async_trait;
use common::Vibe;
use common::retry::{Classify, RetryClass};
use thiserror::Error;

/// Substrings that mark an upstream error as caused by our request or credentials.
const FATAL_MARKERS: &[&str] = &[
    "authentication",
    "permission",
    "invalid",
    "api key",
    "not found",
    "not supported",
];

#[derive(Debug, Error)]
pub enum GenerationError {
    /// API key or model settings missing.
    #[error("generation is not configured: {0}")]
    Configuration(String),
    /// Non-2xx response from the model API.
    #[error("API request failed: {status} - {body}")]
    Api { status: u16, body: String },
    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The model refused to rewrite the text.
    #[error("content blocked by the model")]
    ContentBlocked,
    /// A 2xx response without the expected payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("generation failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u8,
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// 503, or any error mentioning overload.
    pub fn is_overloaded(&self) -> bool {
        match self {
            Self::Api { status, body } => {
                *status == 503 || body.to_lowercase().contains("overloaded")
            }
            Self::Transport(msg) => msg.to_lowercase().contains("overloaded"),
            Self::Exhausted { last, .. } => last.is_overloaded(),
            _ => false,
        }
    }

    /// Whether the upstream is temporarily unable to serve (overload or 429).
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Api { status: 429, .. } => true,
            Self::Exhausted { last, .. } => last.is_unavailable(),
            other => other.is_overloaded(),
        }
    }

    /// Credentials or request shape rejected by the upstream.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Api { status, body } => {
                matches!(status, 401 | 403) || {
                    let lower = body.to_lowercase();
                    lower.contains("api key")
                        || lower.contains("permission")
                        || lower.contains("authentication")
                }
            }
            _ => false,
        }
    }
}

impl Classify for GenerationError {
    fn retry_class(&self) -> RetryClass {
        match self {
            Self::Configuration(_)
            | Self::ContentBlocked
            | Self::MalformedResponse(_)
            | Self::Exhausted { .. } => RetryClass::Fatal,
            Self::Api { status, body } => {
                if self.is_overloaded() {
                    return RetryClass::Overloaded;
                }
                if *status == 429 {
                    return RetryClass::Transient;
                }
                if (400..500).contains(status) || has_fatal_marker(body) {
                    return RetryClass::Fatal;
                }
                RetryClass::Transient
            }
            Self::Transport(msg) => {
                if self.is_overloaded() {
                    RetryClass::Overloaded
                } else if has_fatal_marker(msg) {
                    RetryClass::Fatal
                } else {
                    RetryClass::Transient
                }
            }
        }
    }
}

fn has_fatal_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    FATAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Rewrites a user message in the requested tone.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn rewrite_text(
        &self,
        message: &str,
        vibe: Vibe,
        occasion: &str,
    ) -> Result<String, GenerationError>;
}

/// Produces raw PNG bytes for a card cover.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, vibe: Vibe, occasion: &str) -> Result<Vec<u8>, GenerationError>;
}
