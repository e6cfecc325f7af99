//! Request throttling
//!
//! One throttle is shared by every fetch in a session, pages and resources
//! alike, so consecutive network calls are always at least `min_interval`
//! apart regardless of which URL they target.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Global minimum-interval limiter
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Creates a throttle enforcing `min_interval` between requests
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a throttle from a delay in (fractional) seconds
    pub fn from_secs_f64(delay_seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(delay_seconds.max(0.0)))
    }

    /// The configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next request may be sent, then records it
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind each other instead of firing together when the delay expires.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(wait) = time_until_next_request(*last, self.min_interval, Instant::now()) {
            tracing::trace!("Throttling next request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        *last = Some(Instant::now());
    }
}

/// Calculates the time until the next request can be made
///
/// Returns `None` if a request can be made now, or the duration to wait
/// otherwise.
pub fn time_until_next_request(
    last_request: Option<Instant>,
    min_interval: Duration,
    now: Instant,
) -> Option<Duration> {
    let last = last_request?;
    let elapsed = now.saturating_duration_since(last);
    if elapsed >= min_interval {
        None
    } else {
        Some(min_interval - elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_immediate() {
        let now = Instant::now();
        assert_eq!(
            time_until_next_request(None, Duration::from_secs(1), now),
            None
        );
    }

    #[test]
    fn test_wait_is_remaining_interval() {
        let last = Instant::now();
        let now = last + Duration::from_millis(300);
        assert_eq!(
            time_until_next_request(Some(last), Duration::from_secs(1), now),
            Some(Duration::from_millis(700))
        );
    }

    #[test]
    fn test_no_wait_after_interval() {
        let last = Instant::now();
        let now = last + Duration::from_millis(1500);
        assert_eq!(
            time_until_next_request(Some(last), Duration::from_secs(1), now),
            None
        );
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let last = Instant::now();
        assert_eq!(time_until_next_request(Some(last), Duration::ZERO, last), None);
    }

    #[test]
    fn test_negative_delay_clamped() {
        let throttle = RequestThrottle::from_secs_f64(-3.0);
        assert_eq!(throttle.min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        let throttle = RequestThrottle::new(Duration::from_millis(60));

        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        throttle.acquire().await;

        assert!(
            start.elapsed() >= Duration::from_millis(120),
            "three requests should span at least two intervals, took {:?}",
            start.elapsed()
        );
    }
}
