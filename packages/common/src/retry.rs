use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single failed attempt, recorded before the next retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    /// Delay slept before the next attempt. Zero for the final attempt.
    pub delay_ms: u64,
    /// When this attempt failed.
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>, delay: Duration) -> Self {
        Self {
            attempt,
            error: error.into(),
            delay_ms: delay.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }
}

/// How a failure should be treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Fail immediately (auth, bad request, blocked content, misconfiguration).
    Fatal,
    /// Retry with the standard backoff.
    Transient,
    /// Upstream reported 503 / overloaded: retry with the longer backoff.
    Overloaded,
}

/// Errors that know whether they are worth retrying.
pub trait Classify {
    fn retry_class(&self) -> RetryClass;
}

/// Attempt budget and backoff parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    /// Base delay for transient errors. Default: 1000 ms.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Delay cap for transient errors. Default: 10000 ms.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Base delay for overloaded upstreams. Default: 2000 ms.
    #[serde(default = "default_overloaded_base_delay_ms")]
    pub overloaded_base_delay_ms: u64,
    /// Delay cap for overloaded upstreams. Default: 30000 ms.
    #[serde(default = "default_overloaded_max_delay_ms")]
    pub overloaded_max_delay_ms: u64,
}

fn default_max_attempts() -> u8 {
    3
}
fn default_base_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    10_000
}
fn default_overloaded_base_delay_ms() -> u64 {
    2_000
}
fn default_overloaded_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            overloaded_base_delay_ms: default_overloaded_base_delay_ms(),
            overloaded_max_delay_ms: default_overloaded_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u8, class: RetryClass) -> Duration {
        match class {
            RetryClass::Fatal => Duration::ZERO,
            RetryClass::Transient => calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms),
            RetryClass::Overloaded => calculate_backoff(
                attempt,
                self.overloaded_base_delay_ms,
                self.overloaded_max_delay_ms,
            ),
        }
    }
}

/// Calculate exponential backoff delay.
///
/// Formula: `min(base_ms * 2^(attempt-1), max_ms)`
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor).min(max_ms);
    Duration::from_millis(delay_ms)
}

/// Successful value together with the attempts that failed before it.
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    pub history: Vec<RetryAttempt>,
}

/// Why the retry loop gave up.
#[derive(Debug)]
pub enum RetryFailure<E> {
    /// A non-retryable error ended the loop early.
    Fatal { error: E, history: Vec<RetryAttempt> },
    /// Every attempt failed with a retryable error.
    Exhausted { last: E, history: Vec<RetryAttempt> },
}

impl<E> RetryFailure<E> {
    pub fn history(&self) -> &[RetryAttempt] {
        match self {
            Self::Fatal { history, .. } | Self::Exhausted { history, .. } => history,
        }
    }
}

/// Run `op` until it succeeds, fails fatally, or the attempt budget is spent.
///
/// Sleeps between attempts according to the error's [`RetryClass`]. No sleep
/// happens after the last attempt.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<Retried<T>, RetryFailure<E>>
where
    E: Classify + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut history = Vec::new();
    let mut attempt: u8 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(Retried { value, history }),
            Err(error) => {
                let class = error.retry_class();
                if class == RetryClass::Fatal {
                    history.push(RetryAttempt::new(attempt, error.to_string(), Duration::ZERO));
                    return Err(RetryFailure::Fatal { error, history });
                }

                if attempt >= max_attempts {
                    history.push(RetryAttempt::new(attempt, error.to_string(), Duration::ZERO));
                    return Err(RetryFailure::Exhausted {
                        last: error,
                        history,
                    });
                }

                let delay = policy.delay_for(attempt, class);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed, retrying"
                );
                history.push(RetryAttempt::new(attempt, error.to_string(), delay));
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
