//! Fixed-window request counters, keyed per client IP and per device.

mod memory;

pub use memory::MemoryRateLimitStore;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, Duration, Utc};

use crate::config::RateLimitConfig;

/// Counter state for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Result of counting one request against one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Backing storage for counters.
///
/// `hit` must be atomic per key: concurrent calls for the same identifier can
/// never admit more than `max` requests in one window.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request against `key` and decide whether it is admitted.
    async fn hit(
        &self,
        key: &str,
        max: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> RateLimitDecision;

    /// Current entry for `key`, if any.
    async fn get(&self, key: &str) -> Option<RateLimitEntry>;

    /// Drop entries whose window elapsed before `now`. Returns the number removed.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;
}

/// Which counter rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Ip,
    Device,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Device => "device",
        }
    }

    fn header_label(&self) -> &'static str {
        match self {
            Self::Ip => "IP",
            Self::Device => "Device",
        }
    }
}

/// Both counters admitted the request.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPass {
    pub ip: RateLimitDecision,
    pub device: RateLimitDecision,
}

impl RateLimitPass {
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        append_headers(&mut headers, Dimension::Ip, &self.ip);
        append_headers(&mut headers, Dimension::Device, &self.device);
        headers
    }
}

/// A request was refused by one of the counters.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRejection {
    pub dimension: Dimension,
    pub decision: RateLimitDecision,
    /// IP decision when the device counter was the one that refused.
    pub ip: Option<RateLimitDecision>,
}

impl RateLimitRejection {
    /// Seconds until the refusing window resets, rounded up, at least 1.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.decision.reset_at - now).num_milliseconds().max(0) as u64;
        millis.div_ceil(1000).max(1)
    }

    pub fn message(&self) -> String {
        let who = match self.dimension {
            Dimension::Ip => "this IP",
            Dimension::Device => "this device",
        };
        format!(
            "Too many requests from {who}. Try again after {}",
            self.decision.reset_at.to_rfc3339()
        )
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ip) = &self.ip {
            append_headers(&mut headers, Dimension::Ip, ip);
        }
        append_headers(&mut headers, self.dimension, &self.decision);
        if let Ok(value) = HeaderValue::from_str(self.dimension.as_str()) {
            headers.insert(HeaderName::from_static("x-ratelimit-dimension"), value);
        }
        headers
    }
}

fn append_headers(headers: &mut HeaderMap, dimension: Dimension, decision: &RateLimitDecision) {
    let label = dimension.header_label();
    let values = [
        ("Limit", decision.limit.to_string()),
        ("Remaining", decision.remaining.to_string()),
        ("Reset", decision.reset_at.timestamp_millis().to_string()),
    ];
    for (suffix, value) in values {
        let name = format!("X-RateLimit-{label}-{suffix}");
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(&value),
        ) {
            headers.insert(name, value);
        }
    }
}

/// Composes the IP and device counters over a shared store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    ip_max: u32,
    device_max: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            ip_max: config.ip_max,
            device_max: config.device_max,
            window: i64::try_from(config.window_hours)
                .ok()
                .and_then(Duration::try_hours)
                .unwrap_or(Duration::MAX),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Arc::new(MemoryRateLimitStore::new(config.sweep_threshold)),
            config,
        )
    }

    /// Count one request against an arbitrary identifier.
    pub async fn check(&self, identifier: &str, max: u32, window: Duration) -> RateLimitDecision {
        self.store.hit(identifier, max, window, Utc::now()).await
    }

    /// Check the IP counter, then the device counter.
    ///
    /// A request refused on IP does not consume a device slot.
    pub async fn check_request(
        &self,
        ip: &str,
        device_hash: &str,
    ) -> Result<RateLimitPass, RateLimitRejection> {
        self.check_request_at(ip, device_hash, Utc::now()).await
    }

    pub async fn check_request_at(
        &self,
        ip: &str,
        device_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitPass, RateLimitRejection> {
        let ip_decision = self
            .store
            .hit(&format!("ip:{ip}"), self.ip_max, self.window, now)
            .await;
        if !ip_decision.allowed {
            tracing::info!(ip, reset_at = %ip_decision.reset_at, "IP rate limit exceeded");
            return Err(RateLimitRejection {
                dimension: Dimension::Ip,
                decision: ip_decision,
                ip: None,
            });
        }

        let device_decision = self
            .store
            .hit(
                &format!("device:{device_hash}"),
                self.device_max,
                self.window,
                now,
            )
            .await;
        if !device_decision.allowed {
            tracing::info!(
                device_hash,
                reset_at = %device_decision.reset_at,
                "Device rate limit exceeded"
            );
            return Err(RateLimitRejection {
                dimension: Dimension::Device,
                decision: device_decision,
                ip: Some(ip_decision),
            });
        }

        Ok(RateLimitPass {
            ip: ip_decision,
            device: device_decision,
        })
    }
}
