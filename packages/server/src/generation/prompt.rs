use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Vibe;
use regex::Regex;

use super::GenerationError;

pub const CONTENT_BLOCKED_SENTINEL: &str = "[CONTENT_BLOCKED]";

static DATA_URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/\w+;base64,").expect("data URL regex should compile")
});

fn text_instruction(vibe: Vibe) -> &'static str {
    match vibe {
        Vibe::Warm => "Make it warm, heartfelt, and sincere. Use gentle, comforting language.",
        Vibe::Funny => "Make it lighthearted, playful, and humorous. Add wit and charm.",
        Vibe::Fancy => {
            "Make it elegant, sophisticated, and refined. Use polished, formal language."
        }
        Vibe::Chaotic => "Make it energetic, wild, and fun. Use bold, enthusiastic language.",
    }
}

fn image_description(vibe: Vibe) -> &'static str {
    match vibe {
        Vibe::Warm => "warm, cozy, inviting atmosphere with soft lighting",
        Vibe::Funny => "playful, whimsical, lighthearted scene",
        Vibe::Fancy => "elegant, sophisticated, refined composition",
        Vibe::Chaotic => "energetic, vibrant, dynamic scene",
    }
}

pub fn text_prompt(message: &str, vibe: Vibe, occasion: &str) -> String {
    format!(
        "You are a holiday card message writer. Rewrite the following message. {instruction} \
The message is for {occasion}.

Preserve the user's intent and meaning. Improve clarity and grammar. Avoid clichés and unsafe content.

IMPORTANT SAFETY RULES:
- Do not include any personal information (emails, phone numbers, addresses)
- Do not include hate speech, harassment, or threats
- Do not include defamatory statements about individuals
- If the message violates these rules, respond with only: \"{CONTENT_BLOCKED_SENTINEL}\"
- Output ONLY the rewritten message as plain text, no quotes or formatting

Original message: {message}

Rewritten message:",
        instruction = text_instruction(vibe),
    )
}

pub fn image_prompt(vibe: Vibe, occasion: &str) -> String {
    format!(
        "Create a {description} holiday card cover image for {occasion}.

Requirements:
- Clean composition with good use of negative space
- Festive imagery aligned with {occasion} theme
- NO TEXT OR WORDS in the image
- High quality, suitable for social sharing
- Professional illustration style",
        description = image_description(vibe),
    )
}

/// Validate and tidy model output for a rewritten message.
pub fn clean_text_output(raw: &str) -> Result<String, GenerationError> {
    let text = raw.trim();
    if text.contains(CONTENT_BLOCKED_SENTINEL) || text.to_lowercase().contains("content blocked") {
        return Err(GenerationError::ContentBlocked);
    }

    let text = text
        .strip_prefix(['"', '\''])
        .unwrap_or(text);
    let text = text.strip_suffix(['"', '\'']).unwrap_or(text).trim();

    if text.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "model returned an empty message".into(),
        ));
    }
    Ok(text.to_string())
}

/// Decode a base64 image payload, tolerating a `data:image/...;base64,` prefix.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, GenerationError> {
    let trimmed = payload.trim();
    let data = DATA_URL_PREFIX.replace(trimmed, "");
    let bytes = STANDARD
        .decode(data.as_bytes())
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid base64 image: {e}")))?;
    if bytes.is_empty() {
        return Err(GenerationError::MalformedResponse("empty image payload".into()));
    }
    Ok(bytes)
}
