use sha2::{Digest, Sha256};

/// Stable 16-hex-char fingerprint of a client, from its IP and user agent.
///
/// Used both as the device rate-limit key and as the card's `creator_hash`.
pub fn creator_hash(ip: &str, user_agent: &str) -> String {
    let digest = Sha256::digest(format!("{ip}:{user_agent}").as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(16);
    hex
}
