use std::time::Duration;

use async_trait::async_trait;
use common::Vibe;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::prompt::{clean_text_output, decode_image_payload, image_prompt, text_prompt};
use super::{GenerationError, ImageGenerator, TextGenerator};
use crate::config::GenerationConfig;

/// Gemini `generateContent` REST client for both text and image models.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    api_base: String,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
    /// Older image models return the payload here, as a string or an object.
    image: Option<LegacyImage>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyImage {
    Raw(String),
    Object {
        data: Option<String>,
        base64: Option<String>,
    },
}

impl Part {
    fn image_payload(&self) -> Option<&str> {
        if let Some(data) = self.inline_data.as_ref().and_then(|d| d.data.as_deref()) {
            return Some(data);
        }
        match self.image.as_ref()? {
            LegacyImage::Raw(data) => Some(data.as_str()),
            LegacyImage::Object { data, base64 } => data.as_deref().or(base64.as_deref()),
        }
    }
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.api_base)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: bool,
    ) -> Result<GenerateResponse, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Configuration("generation.api_key is required".into())
        })?;

        let mut payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if image && model.contains("flash-image") {
            payload["generationConfig"] = json!({ "imageConfig": { "aspectRatio": "4:3" } });
        }

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: format!(
                    "{} {}",
                    status.canonical_reason().unwrap_or_default(),
                    body
                ),
            });
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))
    }
}

fn first_parts(response: GenerateResponse) -> Result<Vec<Part>, GenerationError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        GenerationError::MalformedResponse("no candidates in response".into())
    })?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "no parts in response".into(),
        ));
    }
    Ok(parts)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, message), fields(model = %self.text_model))]
    async fn rewrite_text(
        &self,
        message: &str,
        vibe: Vibe,
        occasion: &str,
    ) -> Result<String, GenerationError> {
        let prompt = text_prompt(message, vibe, occasion);
        let response = self.generate(&self.text_model, &prompt, false).await?;

        let text = first_parts(response)?
            .into_iter()
            .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| GenerationError::MalformedResponse("no text part in response".into()))?;

        clean_text_output(&text)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    #[instrument(skip(self), fields(model = %self.image_model))]
    async fn generate_image(&self, vibe: Vibe, occasion: &str) -> Result<Vec<u8>, GenerationError> {
        let prompt = image_prompt(vibe, occasion);
        let response = self.generate(&self.image_model, &prompt, true).await?;

        let parts = first_parts(response)?;
        let payload = parts
            .iter()
            .find_map(Part::image_payload)
            .ok_or_else(|| GenerationError::MalformedResponse("no image part in response".into()))?;

        let bytes = decode_image_payload(payload)?;
        debug!(bytes = bytes.len(), "Generated cover image");
        Ok(bytes)
    }
}
