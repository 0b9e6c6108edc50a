//! Sliding window admission control.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Per-key sliding window rate limiter.
///
/// Keys partition independently; a burst on one resource never affects
/// another. The check-then-append sequence is not atomic across the lock
/// release, so heavy concurrent bursts can slightly over-admit — this is a
/// best-effort guard, not an exact one.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_window(
            config.max_requests,
            Duration::from_secs(config.window_secs),
            config.enabled,
        )
    }

    /// Create a limiter with an explicit window duration.
    pub fn with_window(max_requests: u32, window: Duration, enabled: bool) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: max_requests as usize,
            window,
            enabled,
        }
    }

    /// Admit or deny one request for `key`.
    ///
    /// Prunes timestamps older than the window, then compares the count
    /// against the ceiling. Admission records the current instant; denial
    /// records nothing, so a rejected burst does not extend the lockout.
    pub fn admit(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let entries = windows.entry(key.to_string()).or_default();

        while let Some(front) = entries.front() {
            if now.duration_since(*front) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }

        if entries.len() >= self.max_requests {
            tracing::warn!(key = %key, count = entries.len(), "Rate limit exceeded");
            return false;
        }

        entries.push_back(now);
        true
    }

    /// Current admissions within the window for `key` (after pruning).
    pub fn occupancy(&self, key: &str) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let Some(entries) = windows.get_mut(key) else {
            return 0;
        };
        while let Some(front) = entries.front() {
            if now.duration_since(*front) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }
        entries.len()
    }
}
