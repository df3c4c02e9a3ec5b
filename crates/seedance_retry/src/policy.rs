//! Retry policy.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// How often and how long to retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    max_retries: u32,
    /// Base delay in seconds, doubled on every retry
    backoff_factor: f64,
    /// Response statuses that trigger a retry
    retry_statuses: BTreeSet<u16>,
    /// Upper bound of the uniform random delay added to each backoff
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            retry_statuses: DEFAULT_RETRY_STATUSES.into_iter().collect(),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay in seconds. Negative and NaN values act as zero.
    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// Replaces the retryable status set.
    pub fn with_retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = statuses.into_iter().collect();
        self
    }

    /// Sets the jitter bound.
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns true if a response with this status should be retried.
    pub fn retries_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Deterministic part of the delay before retry `attempt` (0-indexed).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let seconds = self.backoff_factor.max(0.0) * 2f64.powi(exponent);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    /// Delay before retry `attempt` (0-indexed): backoff plus random jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_for(attempt);
        if self.max_jitter.is_zero() {
            return backoff;
        }
        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0.0..=self.max_jitter.as_secs_f64());
        backoff.saturating_add(Duration::from_secs_f64(jitter))
    }
}
