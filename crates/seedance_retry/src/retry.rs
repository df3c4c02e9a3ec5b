//! Retry loop.

use crate::RetryPolicy;
use seedance_error::{RetryableError, StatusCarrier};
use std::fmt::Display;
use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Runs `operation` until it succeeds or the policy gives up.
///
/// An attempt is retried when it fails with an error that reports itself
/// retryable or carries a status in the retry set, or when it succeeds with a
/// value whose embedded status is in the retry set. Before retry `k`
/// (0-indexed) the loop sleeps for [`RetryPolicy::delay_for`]`(k)`.
///
/// Once `max_retries + 1` attempts have run, a failing error is returned as
/// `Err` and a retryable value is returned as `Ok`. Non-retryable errors are
/// returned immediately.
///
/// # Errors
///
/// Returns the last error when it was not retryable or attempts ran out.
#[instrument(skip(policy, operation), fields(max_retries = *policy.max_retries()))]
pub async fn retry_with_backoff<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: StatusCarrier,
    E: RetryableError + Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug!(attempt, "Executing operation");

        match operation().await {
            Ok(value) => {
                let status = value.status_code();
                let retryable = status.is_some_and(|s| policy.retries_status(s));
                if !retryable {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                if attempt >= max_attempts {
                    warn!(attempt, ?status, "All retry attempts exhausted, returning last response");
                    return Ok(value);
                }
                warn!(attempt, ?status, "Retryable response status");
            }
            Err(err) => {
                let retryable = err.is_retryable()
                    || err.status_code().is_some_and(|s| policy.retries_status(s));
                if !retryable {
                    debug!(attempt, error = %err, "Error is not retryable, failing immediately");
                    return Err(err);
                }
                if attempt >= max_attempts {
                    error!(attempt, error = %err, "All retry attempts exhausted");
                    return Err(err);
                }
                warn!(attempt, error = %err, "Transient failure");
            }
        }

        let delay = policy.delay_for(attempt - 1);
        debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
        sleep(delay).await;
    }
}
