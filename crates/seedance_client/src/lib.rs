//! HTTP transport for the Seedance/Volces API.
//!
//! [`VolcesClient`] owns one pooled `reqwest` client, checks the response
//! cache for deterministic text requests, wraps every call in the retry
//! controller and turns failures into structured error responses through
//! [`ErrorClassifier`].
//!
//! Two failure paths reach the caller. An `Err` means the call never produced
//! a response: invalid configuration, invalid input, or a connection-level
//! failure that persisted through every retry. An `Ok` response whose `error`
//! field is set means the API (or decoding) failed in a classified way.

#![warn(missing_docs)]

mod classifier;
mod client;
mod config;
mod metrics;

pub use classifier::ErrorClassifier;
pub use client::VolcesClient;
pub use config::{
    API_KEY_ENV, BASE_HOST_ENV, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_HOST, PoolConfig,
    api_base_host, v3_api_base_url, validate_api_key, validate_base_url,
};
pub use metrics::{CallMetrics, OperationStats};
