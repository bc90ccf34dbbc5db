use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

static COVER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cards/[^/]+/cover-[^/]+\.png").expect("cover key regex should compile")
});

/// Recover the object key from a stored cover URL.
///
/// Handles path-style (`{endpoint}/{bucket}/cards/...`), virtual-host style
/// (`https://{bucket}.s3.{region}.amazonaws.com/cards/...`) and relative
/// filesystem URLs (`/covers/cards/...`). Keys are always `cards/{id}/{file}`,
/// so only the last three path segments are considered; a bucket that is
/// itself named `cards` is not mistaken for the key prefix.
pub fn key_from_url(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url)
        && let Some(segments) = parsed.path_segments()
    {
        let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
        if let Some(idx) = segments.len().checked_sub(3)
            && segments[idx] == "cards"
        {
            return Some(segments[idx..].join("/"));
        }
    }

    COVER_KEY.find(url).map(|m| m.as_str().to_string())
}
