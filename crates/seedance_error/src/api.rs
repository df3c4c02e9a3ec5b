//! The closed taxonomy of API failure kinds.

use serde::{Deserialize, Serialize};

/// Kind of failure reported in a structured error response.
///
/// Serialized in snake_case, e.g. `"rate_limit_error"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    strum::AsRefStr,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApiErrorType {
    /// HTTP 401 or an authentication failure detected in the message.
    #[display("authentication_error")]
    AuthenticationError,
    /// Local validation failure or a malformed request/response body.
    #[display("validation_error")]
    ValidationError,
    /// HTTP 429.
    #[display("rate_limit_error")]
    RateLimitError,
    /// HTTP 500, 502, 503 or 504.
    #[display("server_error")]
    ServerError,
    /// Connection failure, timeout, or any unclassified transport failure.
    #[display("network_error")]
    NetworkError,
    /// Catch-all for failures outside the taxonomy.
    #[default]
    #[serde(other)]
    #[display("unknown_error")]
    UnknownError,
}

impl ApiErrorType {
    /// Classify an HTTP status code.
    ///
    /// Error statuses other than 401, 429 and the retryable 5xx codes are
    /// treated as request validation failures; non-error statuses are unknown.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthenticationError,
            429 => Self::RateLimitError,
            500 | 502 | 503 | 504 => Self::ServerError,
            400..=599 => Self::ValidationError,
            _ => Self::UnknownError,
        }
    }

    /// Whether failures of this kind are expected to clear up on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitError | Self::ServerError | Self::NetworkError
        )
    }
}
