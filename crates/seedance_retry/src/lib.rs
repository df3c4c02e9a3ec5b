//! Retry controller for transport calls.
//!
//! [`retry_with_backoff`] re-runs an attempt while it fails transiently or
//! returns a response whose status is in the policy's retry set. The two
//! outcomes differ once attempts run out: a transient error is propagated,
//! while a retryable response is handed back for the caller to inspect.

#![warn(missing_docs)]

mod policy;
mod retry;

pub use policy::RetryPolicy;
pub use retry::retry_with_backoff;
