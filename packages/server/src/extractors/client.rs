use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::cards::Requester;
use crate::error::AppError;
use crate::state::AppState;

const UNKNOWN: &str = "unknown";

/// Caller identity and the public base URL the request arrived on.
pub struct ClientInfo {
    pub requester: Requester,
    /// Origin for share links, without a trailing slash.
    pub base_url: String,
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        Ok(ClientInfo {
            requester: Requester::new(client_ip(headers), user_agent(headers)),
            base_url: base_url(headers, &state.config.app.public_url),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then `CF-Connecting-IP`.
pub fn client_ip(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .or_else(|| header_str(headers, "cf-connecting-ip"))
        .unwrap_or(UNKNOWN)
        .to_string()
}

pub fn user_agent(headers: &HeaderMap) -> String {
    header_str(headers, header::USER_AGENT.as_str())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// `Origin`, else the forwarded or direct host, else the configured URL.
pub fn base_url(headers: &HeaderMap, fallback: &str) -> String {
    if let Some(origin) = header_str(headers, header::ORIGIN.as_str())
        && origin != "null"
    {
        return origin.trim_end_matches('/').to_string();
    }

    if let Some(host) =
        header_str(headers, "x-forwarded-host").or_else(|| header_str(headers, "host"))
    {
        let default_proto = if host.starts_with("localhost") || host.starts_with("127.0.0.1") {
            "http"
        } else {
            "https"
        };
        let proto = header_str(headers, "x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .unwrap_or(default_proto);
        return format!("{proto}://{host}");
    }

    fallback.trim_end_matches('/').to_string()
}
