//! Resilience primitives for provider calls.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};
use tokio::time::{sleep, Duration};

use crate::error::EnrichError;

/// Default number of artist lookups allowed in flight at once.
pub const MAX_ARTIST_PARALLEL: usize = 4;

/// Base delay before each artist lookup attempt.
pub const BACKOFF_SCHEDULE: [Duration; 4] = [
    Duration::from_millis(0),
    Duration::from_millis(200),
    Duration::from_millis(400),
    Duration::from_millis(700),
];

/// Upper bound of the random jitter added to non-zero backoff steps.
pub const MAX_JITTER: Duration = Duration::from_millis(100);

/// Wait after a transient failure when no usable `Retry-After` was sent.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_millis(300);

/// Ceiling applied to `Retry-After` values.
pub const MAX_RETRY_AFTER: Duration = Duration::from_millis(5000);

/// Process-wide bound on concurrent artist lookups.
///
/// Shared by every track pipeline, independently of how many tracks are
/// in flight. Permits are released when the returned guard drops, so a
/// lookup that errors or is cancelled still frees its slot.
#[derive(Debug, Clone)]
pub struct ArtistSlots {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ArtistSlots {
    /// Creates a pool of `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a slot is free and claims it.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.semaphore.acquire().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently claimed.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for ArtistSlots {
    fn default() -> Self {
        Self::new(MAX_ARTIST_PARALLEL)
    }
}

/// Per-source rate limiter.
///
/// Limits throughput to a configurable number of requests per second by
/// combining a single-permit [`Semaphore`] with a fixed sleep interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` that allows at most
    /// `requests_per_second` requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval: Duration::from_millis(1000 / u64::from(requests_per_second.max(1))),
        }
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval to enforce the rate limit.
    pub async fn acquire(&self) {
        // The semaphore is never closed; if it were, requests simply go
        // through unthrottled.
        if let Ok(_permit) = self.semaphore.acquire().await {
            sleep(self.interval).await;
        }
    }
}

/// Adds up to [`MAX_JITTER`] of random delay to a non-zero backoff step.
pub fn jittered(base: Duration) -> Duration {
    if base.is_zero() {
        return base;
    }
    let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
    base + Duration::from_millis(jitter_ms)
}

/// How long to wait after a transient failure before the next attempt.
///
/// Rate-limit responses honour `Retry-After` (capped at
/// [`MAX_RETRY_AFTER`]); everything else waits [`DEFAULT_RETRY_WAIT`].
pub fn retry_wait(err: &EnrichError) -> Duration {
    match err {
        EnrichError::Status {
            status: 429,
            retry_after: Some(retry_after),
            ..
        } => (*retry_after).min(MAX_RETRY_AFTER),
        _ => DEFAULT_RETRY_WAIT,
    }
}

/// Parses a `Retry-After` header given in (possibly fractional) seconds.
///
/// HTTP-date values are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(seconds.min(86_400.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited(retry_after: Option<Duration>) -> EnrichError {
        EnrichError::Status {
            source_name: "Spotify".to_string(),
            status: 429,
            retry_after,
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 1.5 "), Some(Duration::from_millis(1500)));
        assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn test_retry_wait_uses_header_for_429() {
        let wait = retry_wait(&rate_limited(Some(Duration::from_secs(2))));
        assert_eq!(wait, Duration::from_secs(2));
    }

    #[test]
    fn test_retry_wait_caps_header() {
        let wait = retry_wait(&rate_limited(Some(Duration::from_secs(30))));
        assert_eq!(wait, MAX_RETRY_AFTER);
    }

    #[test]
    fn test_retry_wait_defaults() {
        assert_eq!(retry_wait(&rate_limited(None)), DEFAULT_RETRY_WAIT);

        let server_error = EnrichError::Status {
            source_name: "Spotify".to_string(),
            status: 503,
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(retry_wait(&server_error), DEFAULT_RETRY_WAIT);
    }

    #[test]
    fn test_jitter_bounds() {
        assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
        for _ in 0..50 {
            let d = jittered(Duration::from_millis(200));
            assert!(d >= Duration::from_millis(200));
            assert!(d <= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn test_artist_slots_bound() {
        let slots = ArtistSlots::new(2);
        assert_eq!(slots.capacity(), 2);

        let first = slots.acquire().await.unwrap();
        let _second = slots.acquire().await.unwrap();
        assert_eq!(slots.available(), 0);

        drop(first);
        assert_eq!(slots.available(), 1);
    }

    #[test]
    fn test_artist_slots_minimum_one() {
        assert_eq!(ArtistSlots::new(0).capacity(), 1);
        assert_eq!(ArtistSlots::default().capacity(), MAX_ARTIST_PARALLEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(5);
        let start = tokio::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
