use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::{RateLimitDecision, RateLimitEntry, RateLimitStore};

/// Single-process counter table.
///
/// Each key is updated under its DashMap shard lock, so check-and-increment is
/// atomic under a multi-threaded runtime.
pub struct MemoryRateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
    sweep_threshold: usize,
}

impl MemoryRateLimitStore {
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            sweep_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hit_sync(
        &self,
        key: &str,
        max: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> (RateLimitDecision, bool) {
        let fresh = RateLimitEntry {
            count: 1,
            reset_at: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let admitted_fresh = RateLimitDecision {
            allowed: true,
            limit: max,
            remaining: max.saturating_sub(1),
            reset_at: fresh.reset_at,
        };

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                (admitted_fresh, true)
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.reset_at {
                    *entry = fresh;
                    return (admitted_fresh, true);
                }
                if entry.count >= max {
                    return (
                        RateLimitDecision {
                            allowed: false,
                            limit: max,
                            remaining: 0,
                            reset_at: entry.reset_at,
                        },
                        false,
                    );
                }
                entry.count += 1;
                (
                    RateLimitDecision {
                        allowed: true,
                        limit: max,
                        remaining: max - entry.count,
                        reset_at: entry.reset_at,
                    },
                    false,
                )
            }
        }
    }
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(
        &self,
        key: &str,
        max: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        // The entry guard is dropped before sweeping; retain() needs every shard.
        let (decision, created) = self.hit_sync(key, max, window, now);
        if created && self.entries.len() > self.sweep_threshold {
            self.sweep(now).await;
        }
        decision
    }

    async fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e)
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.reset_at);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Swept rate limit entries");
        }
        removed
    }
}
