//! The sliding-window limiter
//!
//! Per `(class, identifier)` bucket: timestamps of admitted requests in
//! the trailing window. A check prunes the window, then either records
//! the request or denies with the time until the oldest admitted
//! request slides out. Denied requests are not recorded.
//!
//! Buckets are created on first check, mutated on every check, and
//! garbage-collected by [`RateLimiter::sweep`] after the configured
//! idle period. The sweep is caller-invoked — an external scheduler
//! drives it, the limiter never spawns anything.

use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use crate::config::{RateLimitClass, RateLimitConfig};
use crate::identity::{Caller, CallerId};
use ragamala_core::Timestamp;

/// Outcome of one admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// The class ceiling
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// On denial, how long until the window admits again (zero when
    /// allowed)
    pub retry_after: Duration,
    /// When the window next frees a slot
    pub reset_at: Timestamp,
}

impl Decision {
    fn bypass(limit: u32, now: Timestamp) -> Self {
        Decision {
            allowed: true,
            limit,
            remaining: limit,
            retry_after: Duration::ZERO,
            reset_at: now,
        }
    }

    /// Header triple for a protocol boundary:
    /// (limit, remaining, reset-epoch-seconds)
    pub fn headers(&self) -> (u32, u32, u64) {
        (self.limit, self.remaining, self.reset_at.as_secs())
    }
}

#[derive(Debug, Default)]
struct Bucket {
    /// Admitted request times, ordered oldest first
    requests: Vec<Timestamp>,
    last_seen: Timestamp,
}

/// Sliding-window rate limiter
///
/// Process-local; an explicit component instance, constructed and swept
/// by the process entry point.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<(RateLimitClass, CallerId), Bucket>,
}

impl RateLimiter {
    /// Build a limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            config,
            buckets: DashMap::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check a caller against a class, at the current time
    pub fn check(&self, class: RateLimitClass, caller: &Caller) -> Decision {
        self.check_at(class, caller, Timestamp::now())
    }

    /// Check a caller against a class, at an explicit time
    ///
    /// Trusted callers always pass without counting. Otherwise:
    /// timestamps older than `now − window` are dropped; at or over the
    /// ceiling the request is denied and not recorded; below it, `now`
    /// is recorded and the remaining budget reported.
    pub fn check_at(&self, class: RateLimitClass, caller: &Caller, now: Timestamp) -> Decision {
        let limit = self.config.limit(class);
        if self.config.trusted.is_trusted(caller) {
            return Decision::bypass(limit.max, now);
        }

        let key = (class, caller.id());
        let mut bucket = self.buckets.entry(key).or_default();
        bucket.last_seen = now;

        let cutoff = now.saturating_sub(limit.window);
        bucket.requests.retain(|ts| *ts > cutoff);

        let count = bucket.requests.len() as u32;
        if count >= limit.max {
            // oldest admitted request decides when a slot frees up
            let oldest = bucket.requests.first().copied().unwrap_or(now);
            let reset_at = oldest.saturating_add(limit.window);
            let retry_after = reset_at.duration_since(now).unwrap_or(Duration::ZERO);
            debug!(
                class = class.as_str(),
                caller = %caller.id(),
                retry_after_ms = retry_after.as_millis() as u64,
                "rate limit exceeded"
            );
            return Decision {
                allowed: false,
                limit: limit.max,
                remaining: limit.max.saturating_sub(count),
                retry_after,
                reset_at,
            };
        }

        bucket.requests.push(now);
        let new_count = count + 1;
        let oldest = bucket.requests.first().copied().unwrap_or(now);
        Decision {
            allowed: true,
            limit: limit.max,
            remaining: limit.max - new_count,
            retry_after: Duration::ZERO,
            reset_at: oldest.saturating_add(limit.window),
        }
    }

    /// Drop buckets idle past the configured threshold
    ///
    /// Invoked periodically by an external scheduler to bound memory;
    /// returns the number of buckets removed.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let idle = self.config.idle_timeout;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_seen).unwrap_or_default() <= idle);
        let removed = before - self.buckets.len();
        if removed > 0 {
            debug!(removed, "rate-limit buckets swept");
        }
        removed
    }

    /// Number of live buckets, for tests and diagnostics
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
