//! Admission control for outbound OCR calls.

use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Direct (not-keyed) rate limiter type.
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default admission rate: 2 call-starts per second.
pub const DEFAULT_RATE_PER_SECOND: u32 = 2;

/// Shared limiter for calls against the OCR API.
///
/// `acquire` suspends until a slot is free and then grants the right to
/// start exactly one call; callers never observe rate exhaustion as an
/// error. Safe to share across any number of concurrent callers.
pub struct ApiRateLimiter {
    inner: DirectRateLimiter,
}

impl ApiRateLimiter {
    /// Create a limiter admitting `per_second` call-starts per second.
    ///
    /// A zero rate falls back to the default.
    pub fn new(per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(per_second)
                .unwrap_or_else(|| NonZeroU32::new(DEFAULT_RATE_PER_SECOND).unwrap()),
        );
        Self {
            inner: RateLimiter::direct(quota),
        }
    }

    /// Wait for an admission slot.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_PER_SECOND)
    }
}
