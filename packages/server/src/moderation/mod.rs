//! Pre-generation content filter.
//!
//! Every message passes through PII scrubbing, then the unsafe-content,
//! defamation and length checks. The first failing check decides the verdict,
//! but the scrubbed text is always returned.

mod heuristic;
mod pii;

pub use heuristic::HeuristicModerator;
pub use pii::scrub_pii;

/// Why a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationReason {
    Inappropriate,
    Defamatory,
    CriminalAccusation,
    TooShort,
    TooLong,
}

impl ModerationReason {
    /// Stable, log-friendly description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inappropriate => "inappropriate",
            Self::Defamatory => "defamatory",
            Self::CriminalAccusation => "unsubstantiated criminal accusations",
            Self::TooShort => "too short",
            Self::TooLong => "too long",
        }
    }

    /// Message shown to the person who wrote the text.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Inappropriate => {
                "Your message contains inappropriate language. Please revise and try again."
            }
            Self::Defamatory => {
                "Your message contains content that cannot be published. Please revise and try again."
            }
            Self::CriminalAccusation => {
                "Your message contains unsubstantiated criminal accusations. Please revise and try again."
            }
            Self::TooShort => "Your message is too short. Please write a longer message.",
            Self::TooLong => "Your message is too long. Please keep it under 5000 characters.",
        }
    }
}

impl std::fmt::Display for ModerationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of moderating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub allowed: bool,
    /// Input with PII replaced by placeholders, whatever the verdict.
    pub cleaned: String,
    /// Set iff `allowed` is false.
    pub reason: Option<ModerationReason>,
}

impl ModerationVerdict {
    pub fn allow(cleaned: String) -> Self {
        Self {
            allowed: true,
            cleaned,
            reason: None,
        }
    }

    pub fn block(cleaned: String, reason: ModerationReason) -> Self {
        Self {
            allowed: false,
            cleaned,
            reason: Some(reason),
        }
    }
}

/// Pluggable classifier. Implementations must be pure and cheap: they run
/// inline on the request path before any external call.
pub trait Moderator: Send + Sync {
    fn classify(&self, text: &str) -> ModerationVerdict;
}

/// Moderate with the default heuristic rules.
pub fn moderate(text: &str) -> ModerationVerdict {
    HeuristicModerator.classify(text)
}
