//! Vote-endpoint rate limiting.
//!
//! Per-client sliding-window counter, keyed by originating IP. State is an
//! explicit, injectable table rather than a module-level singleton; entries
//! expire lazily on the next check, no background sweep runs.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;

use super::{ApiError, AppState};
use crate::config::RateLimitConfig;

/// Counter state for a single client key.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Result of one check-and-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: u64 },
}

/// Sliding-window limiter for the vote endpoint. Sweeps its own expired
/// entries once the table outgrows `SWEEP_THRESHOLD`.
#[derive(Clone)]
pub struct VoteRateLimiter {
    max_requests: u32,
    window: Duration,
    states: Arc<RwLock<HashMap<String, WindowState>>>,
}

const SWEEP_THRESHOLD: usize = 1024;

impl VoteRateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.vote_max_requests,
            window: Duration::from_secs(config.vote_window_seconds),
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Atomically check the quota for `key` and record the request. The
    /// whole read-modify-write happens under one write lock, so two
    /// concurrent requests can never both observe a stale count.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let mut states = self.states.write().await;
        let now = Instant::now();

        if states.len() > SWEEP_THRESHOLD {
            let window = self.window;
            states.retain(|_, state| now.duration_since(state.window_start) < window);
        }

        let state = states.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(state.window_start) >= self.window {
            state.count = 0;
            state.window_start = now;
        }

        if state.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(state.window_start))
                .as_secs()
                .max(1);
            return RateLimitDecision::Limited { retry_after };
        }

        state.count += 1;
        RateLimitDecision::Allowed
    }

    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Extract the originating client IP from forwarding headers.
fn extract_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    if let Some(xff) = req.headers().get("x-forwarded-for")
        && let Ok(xff_str) = xff.to_str()
        && let Some(first_ip) = xff_str.split(',').next()
        && let Ok(ip) = first_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    if let Some(real_ip) = req.headers().get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
        && let Ok(ip) = ip_str.parse::<IpAddr>()
    {
        return Some(ip);
    }

    None
}

/// Middleware guarding the vote route. Read endpoints are never behind this.
pub async fn vote_rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let key = extract_client_ip(&req).map_or_else(|| "unknown".to_string(), |ip| format!("ip:{ip}"));

    match state.rate_limiter().check(&key).await {
        RateLimitDecision::Allowed => Ok(next.run(req).await),
        RateLimitDecision::Limited { retry_after } => Err(ApiError::RateLimited { retry_after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32, window_seconds: u64) -> RateLimitConfig {
        RateLimitConfig {
            vote_max_requests: max_requests,
            vote_window_seconds: window_seconds,
        }
    }

    #[tokio::test]
    async fn allows_requests_under_quota() {
        let limiter = VoteRateLimiter::new(&config(5, 60));

        for _ in 0..5 {
            assert_eq!(limiter.check("ip:1.2.3.4").await, RateLimitDecision::Allowed);
        }
    }

    #[tokio::test]
    async fn blocks_after_quota_with_retry_after() {
        let limiter = VoteRateLimiter::new(&config(3, 60));

        for _ in 0..3 {
            limiter.check("ip:1.2.3.4").await;
        }

        match limiter.check("ip:1.2.3.4").await {
            RateLimitDecision::Limited { retry_after } => assert!(retry_after > 0),
            RateLimitDecision::Allowed => panic!("Expected Limited"),
        }
    }

    #[tokio::test]
    async fn separate_clients_have_separate_quotas() {
        let limiter = VoteRateLimiter::new(&config(2, 60));

        limiter.check("ip:1.2.3.4").await;
        limiter.check("ip:1.2.3.4").await;

        assert_eq!(
            limiter.check("ip:5.6.7.8").await,
            RateLimitDecision::Allowed
        );
        assert!(matches!(
            limiter.check("ip:1.2.3.4").await,
            RateLimitDecision::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn window_resets_after_elapsing() {
        let limiter = VoteRateLimiter::new(&config(1, 1));

        assert_eq!(limiter.check("ip:1.2.3.4").await, RateLimitDecision::Allowed);
        assert!(matches!(
            limiter.check("ip:1.2.3.4").await,
            RateLimitDecision::Limited { .. }
        ));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(limiter.check("ip:1.2.3.4").await, RateLimitDecision::Allowed);
        assert_eq!(limiter.key_count().await, 1);
    }
}
