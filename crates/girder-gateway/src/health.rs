//! Time-bounded memo of provider viability
//!
//! Re-validating credentials on every call is wasted work; the memo
//! caches the result of a cheap viability check for a fixed TTL and
//! recomputes lazily on the first probe after expiry. Writes are
//! last-writer-wins: a slightly stale health flag is an acceptable
//! tradeoff, never a correctness issue.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// How long a health verdict stays fresh
pub const HEALTH_TTL_SECS: u64 = 30;

/// Per-adapter health memo
#[derive(Debug)]
pub struct HealthMemo {
    healthy: AtomicBool,
    /// Unix seconds of the last check; 0 = never checked
    checked_at: AtomicU64,
    ttl_secs: u64,
}

impl HealthMemo {
    /// Create a memo with the standard TTL
    pub const fn new() -> Self {
        Self::with_ttl(HEALTH_TTL_SECS)
    }

    /// Create a memo with a custom TTL (tests use 0 to force recompute)
    pub const fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            healthy: AtomicBool::new(false),
            checked_at: AtomicU64::new(0),
            ttl_secs,
        }
    }

    /// Return the cached verdict if fresh, otherwise run `check` and
    /// refresh the cache
    ///
    /// The check must be cheap and must not perform network I/O; a
    /// failing check marks the provider unhealthy but never panics the
    /// probe.
    pub fn probe(&self, check: impl FnOnce() -> bool) -> bool {
        let now = now_secs();
        let checked_at = self.checked_at.load(Ordering::Relaxed);

        if checked_at != 0 && now.saturating_sub(checked_at) < self.ttl_secs {
            return self.healthy.load(Ordering::Relaxed);
        }

        let healthy = check();
        self.healthy.store(healthy, Ordering::Relaxed);
        self.checked_at.store(now, Ordering::Relaxed);
        healthy
    }
}

impl Default for HealthMemo {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
