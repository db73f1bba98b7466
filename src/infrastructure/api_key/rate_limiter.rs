//! Rate limiter implementation
//!
//! Provides sliding window rate limiting with a burst allowance for API keys.
//! Each key owns an independently locked window so unrelated keys never wait
//! on each other.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::domain::api_key::{Admission, RateLimitConfig, RateLimitStatus};
use crate::domain::key_hint;

/// Length of the trailing window
pub const WINDOW: Duration = Duration::from_secs(60);

const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub admission: Admission,
    /// Admissions left before throttling starts
    pub remaining: u32,
    /// Hard ceiling for the window (the burst limit)
    pub limit: u32,
    /// Seconds until the oldest request leaves the window
    pub reset_in_seconds: u64,
}

impl RateLimitResult {
    fn unlimited() -> Self {
        Self {
            admission: Admission::Allowed,
            remaining: u32::MAX,
            limit: u32::MAX,
            reset_in_seconds: 0,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.admission.is_allowed()
    }

    /// Window counters as reported to the client
    pub fn status(&self) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.limit,
            remaining: self.remaining,
            reset_in_seconds: self.reset_in_seconds,
        }
    }
}

/// Per-key window of admitted request instants
#[derive(Debug)]
struct WindowState {
    /// Admission instants, oldest first
    timestamps: VecDeque<Instant>,
    /// Last explicit or implicit reset
    anchor: Instant,
}

impl WindowState {
    fn new(now: Instant) -> Self {
        Self {
            timestamps: VecDeque::new(),
            anchor: now,
        }
    }

    /// Drop every entry older than the window; an idle window re-anchors
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.duration_since(oldest) > WINDOW {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.is_empty() && now.duration_since(self.anchor) > WINDOW {
            self.anchor = now;
        }
    }

    fn clear(&mut self, now: Instant) {
        self.timestamps.clear();
        self.anchor = now;
    }

    fn count(&self) -> u32 {
        self.timestamps.len() as u32
    }

    fn reset_in_seconds(&self, now: Instant) -> u64 {
        let Some(&oldest) = self.timestamps.front() else {
            return 0;
        };

        let left = WINDOW.saturating_sub(now.duration_since(oldest));
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    fn is_idle(&self, now: Instant) -> bool {
        self.timestamps
            .back()
            .is_none_or(|&newest| now.duration_since(newest) > WINDOW)
    }
}

/// Rate limiter for API keys
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Per-key windows, each behind its own lock
    windows: DashMap<String, Arc<Mutex<WindowState>>>,
    cleanup_interval: Duration,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Limiter that admits everything
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig::disabled())
    }

    /// Override how often idle windows are evicted
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check a request against the key's window and record it if admitted
    ///
    /// Prune, compare and append happen under the key's lock, so concurrent
    /// calls for one key can never admit more than `burst_limit` requests per
    /// window. Rejected requests are not recorded.
    pub async fn admit(&self, key: &str) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::unlimited();
        }

        self.maybe_cleanup().await;

        let window = self.window_for(key);
        let mut state = window.lock().await;

        let now = Instant::now();
        state.prune(now);

        let count = state.count();
        let admission = if count < self.config.requests_per_minute {
            Admission::Allowed
        } else if count < self.config.burst_limit {
            Admission::AllowedBurst
        } else {
            Admission::Throttled {
                retry_after_secs: state.reset_in_seconds(now).max(1),
            }
        };

        if admission.is_allowed() {
            state.timestamps.push_back(now);
        }

        let result = RateLimitResult {
            admission,
            remaining: self.config.burst_limit.saturating_sub(state.count()),
            limit: self.config.burst_limit,
            reset_in_seconds: state.reset_in_seconds(now),
        };
        drop(state);

        match admission {
            Admission::Allowed => {
                debug!(key = %key_hint(key), count = count + 1, "Request admitted");
            }
            Admission::AllowedBurst => {
                warn!(
                    key = %key_hint(key),
                    count = count + 1,
                    requests_per_minute = self.config.requests_per_minute,
                    burst_allowance = self.config.burst_allowance(),
                    "Burst limit used for API key"
                );
            }
            Admission::Throttled { retry_after_secs } => {
                warn!(
                    key = %key_hint(key),
                    count,
                    burst_limit = self.config.burst_limit,
                    retry_after_secs,
                    "Rate limit exceeded for API key"
                );
            }
        }

        result
    }

    /// Forget every recorded request for `key`
    ///
    /// Resetting a key that has never been seen is a no-op.
    pub async fn reset(&self, key: &str) {
        let window = self.windows.get(key).map(|w| Arc::clone(w.value()));

        match window {
            Some(window) => {
                window.lock().await.clear(Instant::now());
                info!(key = %key_hint(key), "Manually reset rate limit for API key");
            }
            None => {
                debug!(key = %key_hint(key), "Rate limit reset for key without recorded requests");
            }
        }
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn window_for(&self, key: &str) -> Arc<Mutex<WindowState>> {
        if let Some(window) = self.windows.get(key) {
            return Arc::clone(window.value());
        }

        let entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(WindowState::new(Instant::now()))));

        Arc::clone(entry.value())
    }

    async fn maybe_cleanup(&self) {
        // Someone else is already cleaning up
        let Ok(mut last) = self.last_cleanup.try_lock() else {
            return;
        };

        let now = Instant::now();
        if now.duration_since(*last) < self.cleanup_interval {
            return;
        }
        *last = now;
        drop(last);

        let before = self.windows.len();

        // A window referenced outside the map is in use and must stay
        self.windows.retain(|_, window| {
            if Arc::strong_count(window) > 1 {
                return true;
            }
            match window.try_lock() {
                Ok(state) => !state.is_idle(now),
                Err(_) => true,
            }
        });

        let evicted = before.saturating_sub(self.windows.len());
        if evicted > 0 {
            debug!(evicted, "Evicted idle rate limit windows");
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
