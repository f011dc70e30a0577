//! # afya-limiter
//!
//! Per-key sliding-window admission control, shared by the HTTP and
//! WebSocket paths.
//!
//! Each key owns an ordered sequence of admitted-call timestamps. On every
//! admission attempt the bucket is pruned of entries older than the window,
//! then the attempt is rejected if the bucket is full or appended otherwise.
//! The prune-check-append sequence runs under one mutex, so concurrent
//! attempts for the same key can never admit past the limit.
//!
//! Buckets whose newest entry has aged out of the window are evicted on a
//! fixed admission cadence, bounding memory by the number of distinct
//! *active* keys rather than by total calls. Limiter state lives in memory
//! only and resets on process restart.

#![deny(unsafe_code)]

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Admissions between stale-bucket sweeps.
const EVICT_EVERY: u64 = 512;

/// Error returned when a key has exhausted its window quota.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("rate limit exceeded")]
pub struct RateLimited;

struct LimiterState {
    buckets: HashMap<String, VecDeque<Instant>>,
    admissions_since_sweep: u64,
}

/// Sliding-window rate limiter.
///
/// One global lock serializes all admissions; the critical section is a
/// prune plus a push, so contention stays negligible at gateway call rates.
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Create a limiter admitting `limit` calls per key per `window`.
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(LimiterState {
                buckets: HashMap::new(),
                admissions_since_sweep: 0,
            }),
        }
    }

    /// Attempt to admit a call for `key` at the current time.
    pub fn admit(&self, key: &str) -> Result<(), RateLimited> {
        self.admit_at(key, Instant::now())
    }

    /// Attempt to admit a call for `key` at an explicit `now`.
    ///
    /// The injected clock exists for tests; production callers use
    /// [`RateLimiter::admit`]. `now` must not move backwards between calls
    /// for the same key.
    pub fn admit_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut state = self.state.lock();

        let bucket = state.buckets.entry(key.to_owned()).or_default();
        while let Some(oldest) = bucket.front() {
            if now.duration_since(*oldest) > self.window {
                let _ = bucket.pop_front();
            } else {
                break;
            }
        }
        if bucket.len() >= self.limit {
            debug!(key, in_window = bucket.len(), "admission rejected");
            return Err(RateLimited);
        }
        bucket.push_back(now);

        state.admissions_since_sweep += 1;
        if state.admissions_since_sweep >= EVICT_EVERY {
            state.admissions_since_sweep = 0;
            self.evict_stale(&mut state.buckets, now);
        }
        Ok(())
    }

    /// Number of keys currently holding a bucket.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().buckets.len()
    }

    /// Number of in-window admissions recorded for `key`.
    #[must_use]
    pub fn in_window(&self, key: &str) -> usize {
        self.state
            .lock()
            .buckets
            .get(key)
            .map_or(0, VecDeque::len)
    }

    /// Drop buckets whose newest admission is older than the window.
    fn evict_stale(&self, buckets: &mut HashMap<String, VecDeque<Instant>>, now: Instant) {
        let before = buckets.len();
        buckets.retain(|_, bucket| {
            bucket
                .back()
                .is_some_and(|newest| now.duration_since(*newest) <= self.window)
        });
        let evicted = before - buckets.len();
        if evicted > 0 {
            debug!(evicted, remaining = buckets.len(), "evicted stale buckets");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
