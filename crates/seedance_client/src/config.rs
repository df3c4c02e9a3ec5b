//! Client configuration.
//!
//! Values come from code through [`ClientConfigBuilder`] or from the
//! environment through [`ClientConfig::from_env`]:
//!
//! - `VOLCES_API_KEY`: credential (required, at least 10 characters)
//! - `VOLCES_BASE_HOST`: API host without version path (default
//!   `https://api.volces.com`); the client talks to `{host}/v3`
//!
//! A `.env` file in the working directory is loaded first when present.

use derive_builder::Builder;
use derive_getters::Getters;
use seedance_cache::ResponseCacheConfig;
use seedance_error::{ConfigError, SeedanceResult};
use seedance_retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "VOLCES_API_KEY";

/// Environment variable overriding the API host.
pub const BASE_HOST_ENV: &str = "VOLCES_BASE_HOST";

/// Host used when `VOLCES_BASE_HOST` is unset or empty.
pub const DEFAULT_BASE_HOST: &str = "https://api.volces.com";

/// API host without version path.
pub fn api_base_host() -> String {
    std::env::var(BASE_HOST_ENV)
        .ok()
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_HOST.to_string())
}

/// Base URL of the v3 API, `{host}/v3`.
pub fn v3_api_base_url() -> String {
    format!("{}/v3", api_base_host())
}

/// Checks that an API key is present and plausibly formatted.
///
/// # Errors
///
/// Fails if the key is empty or shorter than 10 characters.
#[track_caller]
pub fn validate_api_key(api_key: &str) -> Result<(), ConfigError> {
    if api_key.is_empty() {
        return Err(ConfigError::new("API key is required"));
    }
    if api_key.chars().count() < 10 {
        return Err(ConfigError::new(
            "Invalid API key format - must be at least 10 characters",
        ));
    }
    Ok(())
}

/// Checks that a base URL uses an HTTP scheme.
///
/// # Errors
///
/// Fails unless the URL starts with `http://` or `https://`.
#[track_caller]
pub fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::new("Base URL must start with http:// or https://"))
    }
}

/// Connection pool limits.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct PoolConfig {
    /// Idle connections kept per host
    pool_maxsize: usize,
    /// How long an idle connection is kept open
    idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_maxsize: 20,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Validated client configuration.
#[derive(Clone, PartialEq, Getters, Builder)]
#[builder(
    pattern = "owned",
    setter(into),
    build_fn(private, name = "build_unvalidated")
)]
pub struct ClientConfig {
    /// Bearer credential
    #[getter(skip)]
    api_key: String,
    /// API base URL, used verbatim
    #[builder(default = "v3_api_base_url()")]
    base_url: String,
    /// Per-request deadline
    #[builder(default = "Duration::from_secs(30)")]
    timeout: Duration,
    /// Connection pool limits
    #[builder(default)]
    pool: PoolConfig,
    /// Retry behaviour
    #[builder(default)]
    retry: RetryPolicy,
    /// Response cache limits
    #[builder(default)]
    cache: ResponseCacheConfig,
}

impl ClientConfig {
    /// Creates a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Reads the configuration from the environment.
    ///
    /// Loads `.env` if present, then resolves the key and base URL as
    /// [`ClientConfigBuilder::build`] does.
    ///
    /// # Errors
    ///
    /// Fails if the API key is missing or invalid.
    pub fn from_env() -> SeedanceResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::trace!(error = %e, "No .env file loaded");
        }
        Self::builder().build()
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("pool", &self.pool)
            .field("retry", &self.retry)
            .field("cache", &self.cache)
            .finish()
    }
}

impl ClientConfigBuilder {
    /// Builds and validates the configuration.
    ///
    /// An API key set on the builder wins; otherwise `VOLCES_API_KEY` is used.
    ///
    /// # Errors
    ///
    /// Fails if the API key is missing, shorter than 10 characters, or the
    /// base URL does not use an HTTP scheme.
    pub fn build(mut self) -> SeedanceResult<ClientConfig> {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        }
        let config = self.build_unvalidated().map_err(|e| match e {
            ClientConfigBuilderError::UninitializedField("api_key") => {
                ConfigError::new("API key is required")
            }
            other => ConfigError::new(other.to_string()),
        })?;
        validate_api_key(&config.api_key)?;
        validate_base_url(&config.base_url)?;
        Ok(config)
    }
}
