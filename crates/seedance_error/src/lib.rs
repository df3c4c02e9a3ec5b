//! Error types for the Seedance/Volces API client.
//!
//! Thrown failures (configuration, validation, persistent transport errors)
//! are [`SeedanceError`]s carrying the location they were raised at.
//! Classified API failures use the [`ApiErrorType`] taxonomy and travel inside
//! structured responses instead.

mod api;
mod config;
mod error;
mod transport;
mod validation;

pub use api::ApiErrorType;
pub use config::ConfigError;
pub use error::{RetryableError, SeedanceError, SeedanceErrorKind, SeedanceResult, StatusCarrier};
pub use transport::{TransportError, TransportErrorKind};
pub use validation::{ValidationViolation, ViolationKind};
