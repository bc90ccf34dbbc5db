use async_trait::async_trait;
use common::Vibe;
use common::retry::{RetryFailure, RetryPolicy, retry_with_backoff};
use tracing::{error, info};

use super::{GenerationError, ImageGenerator, TextGenerator};

/// Adds bounded retries with exponential backoff to any generator.
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G> RetryingGenerator<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

fn into_generation_error(
    operation: &str,
    failure: RetryFailure<GenerationError>,
) -> GenerationError {
    match failure {
        RetryFailure::Fatal { error, .. } => {
            error!(operation, error = %error, "Generation failed with non-retryable error");
            error
        }
        RetryFailure::Exhausted { last, history } => {
            let attempts = history.len() as u8;
            error!(operation, attempts, error = %last, "Generation retries exhausted");
            GenerationError::Exhausted {
                attempts,
                last: Box::new(last),
            }
        }
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    async fn rewrite_text(
        &self,
        message: &str,
        vibe: Vibe,
        occasion: &str,
    ) -> Result<String, GenerationError> {
        let outcome = retry_with_backoff(&self.policy, "rewrite_text", || {
            self.inner.rewrite_text(message, vibe, occasion)
        })
        .await
        .map_err(|f| into_generation_error("rewrite_text", f))?;

        if !outcome.history.is_empty() {
            info!(retries = outcome.history.len(), "Message rewrite succeeded after retries");
        }
        Ok(outcome.value)
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for RetryingGenerator<G> {
    async fn generate_image(&self, vibe: Vibe, occasion: &str) -> Result<Vec<u8>, GenerationError> {
        let outcome = retry_with_backoff(&self.policy, "generate_image", || {
            self.inner.generate_image(vibe, occasion)
        })
        .await
        .map_err(|f| into_generation_error("generate_image", f))?;

        if !outcome.history.is_empty() {
            info!(retries = outcome.history.len(), "Image generation succeeded after retries");
        }
        Ok(outcome.value)
    }
}
