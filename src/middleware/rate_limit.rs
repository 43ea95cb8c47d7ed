//! Rate limiting middleware.
//!
//! In-memory fixed window per client IP with a burst allowance on top.

use crate::middleware::client_ip;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Configuration for rate limiting.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
    /// Extra requests above the limit before hard reject.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            burst: 20,
        }
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
enum RateLimitResult {
    Allowed,
    BurstUsed,
    Exceeded { retry_after: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut state = self.state.lock();
        let now = Instant::now();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        let limit = self.config.max_requests + self.config.burst;
        if entry.count > limit {
            let reset_at = entry.window_start + self.config.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else if entry.count > self.config.max_requests {
            RateLimitResult::BurstUsed
        } else {
            RateLimitResult::Allowed
        }
    }

    /// Drop entries idle for two windows (call from a background task).
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }
}

/// Rate limiting middleware function.
///
/// Requests without connect info share a single bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&request).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        RateLimitResult::Allowed | RateLimitResult::BurstUsed => next.run(request).await,
        RateLimitResult::Exceeded { retry_after } => {
            warn!(
                ip = %ip,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );

            let body = serde_json::json!({
                "error": "rate_limit_exceeded",
                "message": "Too many requests. Please slow down.",
                "retry_after_seconds": retry_after.as_secs(),
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.as_secs().to_string())],
                Json(body),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, burst: u32) -> RateLimitLayer {
        RateLimitLayer::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            burst,
        })
    }

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let limiter = limiter(10, 5);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..10 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
    }

    #[test]
    fn test_rate_limit_burst_then_reject() {
        let limiter = limiter(5, 3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..5 {
            assert_eq!(limiter.check(ip), RateLimitResult::Allowed);
        }
        for _ in 0..3 {
            assert_eq!(limiter.check(ip), RateLimitResult::BurstUsed);
        }
        assert!(matches!(
            limiter.check(ip),
            RateLimitResult::Exceeded { .. }
        ));

        // Other clients have their own window
        let other: IpAddr = "10.0.0.2".parse().unwrap();
        assert_eq!(limiter.check(other), RateLimitResult::Allowed);
    }

    #[test]
    fn test_cleanup_keeps_fresh_entries() {
        let limiter = limiter(5, 0);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        limiter.check(ip);
        limiter.cleanup();
        assert_eq!(limiter.state.lock().len(), 1);
    }
}
