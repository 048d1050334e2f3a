//! Rate limiting middleware using Governor.
//!
//! Implements per-tenant rate limiting with a token bucket algorithm. The
//! tenant is read from the `X-Company-Id` header. That header is not
//! authenticated here: deploy behind a proxy that sets or verifies it,
//! otherwise a client can rotate it to obtain fresh buckets.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use super::handlers::COMPANY_ID_HEADER;

/// Key shared by requests that name no tenant.
const ANONYMOUS: &str = "anonymous";

/// Tracked tenants before idle buckets are swept.
const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// One bucket per tenant key
    limiter: DefaultKeyedRateLimiter<String>,
    window: Duration,
    max_tracked_keys: usize,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Allows `max_requests` per `window` for each tenant.
    ///
    /// The full allowance is available as a burst and refills evenly across
    /// the window.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
            window,
            max_tracked_keys: DEFAULT_MAX_TRACKED_KEYS,
        }
    }

    /// Sweeps idle buckets once more than `max` tenants are tracked.
    pub fn with_max_tracked_keys(mut self, max: usize) -> Self {
        self.max_tracked_keys = max.max(1);
        self
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let allowed = self.limiter.check_key(&key.to_string()).is_ok();

        if self.limiter.len() > self.max_tracked_keys {
            // Buckets that have fully refilled carry no state worth keeping
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            tracing::debug!(tracked = self.limiter.len(), "Swept idle rate limit buckets");
        }

        allowed
    }

    /// Number of tenant buckets currently held.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = request
        .headers()
        .get(COMPANY_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string();

    if !limiter.check(&key) {
        tracing::warn!(company_id = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": "RATE_LIMITED",
                "retry_after_seconds": limiter.window().as_secs().max(1)
            })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_is_per_key() {
        let limiter = RateLimiterState::new(2, Duration::from_secs(60));

        assert!(limiter.check("company-a"));
        assert!(limiter.check("company-a"));
        assert!(!limiter.check("company-a"));
        assert!(limiter.check("company-b"));
    }

    #[test]
    fn test_idle_buckets_are_swept() {
        let limiter =
            RateLimiterState::new(1, Duration::from_millis(1)).with_max_tracked_keys(4);

        for i in 0..20 {
            assert!(limiter.check(&format!("rotating-{i}")));
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(limiter.tracked_keys() <= 5);
    }

    #[test]
    fn test_sweep_keeps_exhausted_buckets() {
        let limiter =
            RateLimiterState::new(1, Duration::from_secs(60)).with_max_tracked_keys(2);

        assert!(limiter.check("company-a"));
        for i in 0..5 {
            limiter.check(&format!("other-{i}"));
        }

        assert!(!limiter.check("company-a"));
    }

    #[test]
    fn test_zero_max_still_allows_one() {
        let limiter = RateLimiterState::new(0, Duration::from_secs(60));

        assert!(limiter.check("company-a"));
        assert!(!limiter.check("company-a"));
    }
}
