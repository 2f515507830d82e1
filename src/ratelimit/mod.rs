use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::duration;

pub const DEFAULT_MAX_REQUESTS: u32 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-window tunables, read once at process start.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitSettings {
    pub fn from_env() -> Self {
        let max_requests = match dotenvy::var("RATE_LIMIT_MAX_REQUESTS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    value = raw.as_str(),
                    "invalid RATE_LIMIT_MAX_REQUESTS, using default"
                );
                DEFAULT_MAX_REQUESTS
            }),
            Err(_) => DEFAULT_MAX_REQUESTS,
        };

        let window = match dotenvy::var("RATE_LIMIT_WINDOW") {
            Ok(raw) => duration::parse(&raw).unwrap_or_else(|| {
                warn!(
                    value = raw.as_str(),
                    "invalid RATE_LIMIT_WINDOW, using default"
                );
                DEFAULT_WINDOW
            }),
            Err(_) => DEFAULT_WINDOW,
        };

        Self {
            max_requests,
            window,
        }
    }
}

/// Outcome of one limiter check. `reset` is the unix second the current
/// window ends on; `remaining` is zero whenever the check blocked.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
}

#[derive(Debug)]
struct Window {
    started_ts: i64,
    count: u32,
}

/// Fixed-window request counter keyed by user id. Counters are the only
/// state in the process that outlives a request.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn check(&self, id: &str, max: u32, window: Duration) -> RateLimitResult {
        self.check_at(id, max, window, Utc::now().timestamp()).await
    }

    async fn check_at(&self, id: &str, max: u32, window: Duration, now_ts: i64) -> RateLimitResult {
        let window_secs = window.as_secs() as i64;
        let mut windows = self.windows.lock().await;

        let entry = windows.entry(id.to_string()).or_insert(Window {
            started_ts: now_ts,
            count: 0,
        });

        if now_ts >= entry.started_ts + window_secs {
            entry.started_ts = now_ts;
            entry.count = 0;
        }

        let reset = entry.started_ts + window_secs;

        if entry.count >= max {
            return RateLimitResult {
                allowed: false,
                limit: max,
                remaining: 0,
                reset,
            };
        }

        entry.count += 1;
        RateLimitResult {
            allowed: true,
            limit: max,
            remaining: max - entry.count,
            reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn counts_down_then_blocks() {
        let limiter = RateLimiter::new();

        let first = limiter.check_at("u1", 2, WINDOW, 100).await;
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert_eq!(first.reset, 160);

        let second = limiter.check_at("u1", 2, WINDOW, 110).await;
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check_at("u1", 2, WINDOW, 120).await;
        assert!(!third.allowed);
        assert_eq!(third.limit, 2);
        assert_eq!(third.remaining, 0);
        assert_eq!(third.reset, 160);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let limiter = RateLimiter::new();

        let blocked = limiter.check_at("u1", 1, WINDOW, 100).await;
        assert!(blocked.allowed);
        assert!(!limiter.check_at("u1", 1, WINDOW, 130).await.allowed);

        let fresh = limiter.check_at("u1", 1, WINDOW, 161).await;
        assert!(fresh.allowed);
        assert_eq!(fresh.reset, 221);
    }

    #[tokio::test]
    async fn ids_are_tracked_independently() {
        let limiter = RateLimiter::new();

        assert!(limiter.check_at("u1", 1, WINDOW, 100).await.allowed);
        assert!(!limiter.check_at("u1", 1, WINDOW, 101).await.allowed);
        assert!(limiter.check_at("u2", 1, WINDOW, 101).await.allowed);
    }

    #[tokio::test]
    async fn zero_limit_blocks_every_request() {
        let limiter = RateLimiter::new();
        let result = limiter.check_at("u1", 0, WINDOW, 100).await;
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }
}
