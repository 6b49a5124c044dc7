//! Sliding-window request limiter
//!
//! Keeps the timestamps of the most recent requests (at most `quota` of
//! them). When the window is full, the caller is blocked until the oldest
//! request is 60 seconds old, so no trailing 60s window ever holds more
//! than `quota` requests. Requests are delayed, never dropped.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Length of the quota window
pub const WINDOW: Duration = Duration::from_secs(60);

/// Bounded, time-ordered record of recent requests
#[derive(Debug)]
pub struct RateLimiter {
    capacity: usize,
    requests: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` requests per window
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute.max(1) as usize;
        Self {
            capacity,
            requests: VecDeque::with_capacity(capacity),
        }
    }

    /// Drop expired entries and return how long a request made at `now`
    /// has to wait, if at all.
    pub fn delay_at(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = self.requests.front() {
            if now.duration_since(oldest) > WINDOW {
                self.requests.pop_front();
            } else {
                break;
            }
        }

        if self.requests.len() < self.capacity {
            return None;
        }

        let oldest = *self.requests.front()?;
        WINDOW
            .checked_sub(now.duration_since(oldest))
            .filter(|wait| !wait.is_zero())
    }

    /// Record a request issued at `at`, evicting the oldest entry when full
    pub fn record(&mut self, at: Instant) {
        if self.requests.len() >= self.capacity {
            self.requests.pop_front();
        }
        self.requests.push_back(at);
    }

    /// Wait for a free slot in the window, then claim it.
    ///
    /// Returns the time spent waiting.
    pub async fn acquire(&mut self) -> Duration {
        let started = Instant::now();

        if let Some(wait) = self.delay_at(started) {
            tracing::warn!("Rate limit reached. Waiting {:.2}s", wait.as_secs_f32());
            tokio::time::sleep(wait).await;
        }

        self.record(Instant::now());
        started.elapsed()
    }

    /// Number of requests currently tracked in the window
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delay_below_quota() {
        let mut limiter = RateLimiter::new(3);
        let t0 = Instant::now();
        limiter.record(t0);
        limiter.record(t0 + Duration::from_secs(1));
        assert_eq!(limiter.delay_at(t0 + Duration::from_secs(2)), None);
    }

    #[test]
    fn test_delay_when_full() {
        let mut limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        limiter.record(t0);
        limiter.record(t0 + Duration::from_secs(5));

        // 60 - (15 - 0) = 45s until the oldest request leaves the window
        let wait = limiter.delay_at(t0 + Duration::from_secs(15));
        assert_eq!(wait, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let mut limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        limiter.record(t0);
        limiter.record(t0 + Duration::from_secs(30));

        assert_eq!(limiter.delay_at(t0 + Duration::from_secs(61)), None);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_exactly_sixty_seconds_needs_no_wait() {
        let mut limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        limiter.record(t0);
        assert_eq!(limiter.delay_at(t0 + WINDOW), None);
    }

    #[test]
    fn test_record_is_bounded() {
        let mut limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        for i in 0..5 {
            limiter.record(t0 + Duration::from_secs(i));
        }
        assert_eq!(limiter.len(), 2);
        assert_eq!(limiter.capacity(), 2);
    }

    #[test]
    fn test_zero_quota_is_treated_as_one() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_oldest_to_expire() {
        let mut limiter = RateLimiter::new(3);
        for _ in 0..3 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }

        tokio::time::advance(Duration::from_secs(10)).await;

        let before = Instant::now();
        let waited = limiter.acquire().await;
        assert_eq!(waited, Duration::from_secs(50));
        assert_eq!(before.elapsed(), Duration::from_secs(50));
        assert_eq!(limiter.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_more_than_quota_in_any_window() {
        let mut limiter = RateLimiter::new(4);
        let start = Instant::now();
        let mut issued = Vec::new();
        for _ in 0..10 {
            limiter.acquire().await;
            issued.push(Instant::now().duration_since(start));
        }

        for (i, &t) in issued.iter().enumerate() {
            let in_window = issued[i..].iter().filter(|&&u| u < t + WINDOW).count();
            assert!(in_window <= 4, "{} requests within 60s of {:?}", in_window, t);
        }
    }
}
