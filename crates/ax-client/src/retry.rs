//! Retry handling for transient request failures.
//!
//! Failed attempts back off exponentially: the first retry waits the
//! configured initial delay and every later retry doubles the previous wait,
//! up to a ceiling. The schedule is deterministic, there is no jitter.

use std::cmp;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for the doubled delays.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling for the doubled delays.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Start a fresh backoff schedule for one request.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            next: cmp::min(self.initial_delay, self.max_delay),
            max_delay: self.max_delay,
            max_retries: self.max_attempts,
            retries: 0,
        }
    }
}

/// The backoff schedule of a single request.
///
/// Hands out one delay per retry, doubling the wait each time while keeping
/// it under the ceiling, until the retry budget is spent.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max_delay: Duration,
    max_retries: u32,
    retries: u32,
}

impl Backoff {
    /// Number of retries handed out so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The delay to wait before the next retry, or `None` once the retry
    /// budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.retries == self.max_retries {
            return None;
        }
        self.retries += 1;

        let delay = self.next;
        self.next = cmp::min(self.next.saturating_mul(2), self.max_delay);
        Some(delay)
    }
}

/// Server statuses worth retrying. 429 is deliberately absent, it flows to
/// rate limit handling instead.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500 | 502 | 503 | 504)
}

/// Transport failures worth retrying. Redirect loops and request build
/// failures surface unchanged.
pub(crate) fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
