use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::domain::auth::ports::RateLimitDecision;
use crate::domain::auth::ports::RateLimiter;

/// In-process fixed-window limiter.
///
/// Counts attempts per key; the window restarts when it elapses. State is
/// per-instance, which is enough for a single-node deployment.
pub struct FixedWindowRateLimiter {
    window: Duration,
    max_attempts: u32,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowRateLimiter {
    pub fn new(window: Duration, max_attempts: u32) -> Self {
        Self {
            window,
            max_attempts,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }

        if entry.1 >= self.max_attempts {
            return RateLimitDecision::Limited;
        }

        entry.1 += 1;
        RateLimitDecision::Allowed
    }
}

/// Limiter that allows everything; used in tests.
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _key: &str) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}
