//! Client library for the Seedance/Volces video and text generation API.
//!
//! Requests are validated when they are built, so an invalid payload never
//! reaches the network. The [`VolcesClient`] sends them over one pooled
//! connection, retries transient failures with exponential backoff and
//! jitter, caches deterministic text responses and reports API failures as
//! structured error responses.
//!
//! # Example
//!
//! ```no_run
//! use seedance::{ContentItem, ImageRole, Resolution, VideoGenerationRequest, VolcesClient};
//!
//! # async fn run() -> Result<(), seedance::SeedanceError> {
//! seedance::init_tracing().ok();
//!
//! let client = VolcesClient::from_env()?;
//! let request = VideoGenerationRequest::builder()
//!     .model("doubao-seedance-1-0-pro")
//!     .push_content(ContentItem::image("https://example.com/first.jpg", Some(ImageRole::FirstFrame)))
//!     .push_content(ContentItem::text("The camera slowly pulls back"))
//!     .resolution(Resolution::P720)
//!     .duration(5)
//!     .build()?;
//!
//! let task = client.create_video_task(&request).await?;
//! match task.error() {
//!     Some(error) => eprintln!("{}: {}", error.error_type, error.message),
//!     None => println!("task {:?} submitted", task.id()),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod logging;

pub use logging::{InitError, LogFormat, init_tracing, init_tracing_with};

pub use seedance_cache::{
    CachedEntry, Fingerprint, ResponseCache, ResponseCacheConfig, fingerprint,
};
pub use seedance_client::{
    API_KEY_ENV, BASE_HOST_ENV, CallMetrics, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_HOST,
    ErrorClassifier, OperationStats, PoolConfig, VolcesClient, api_base_host, v3_api_base_url,
    validate_api_key, validate_base_url,
};
pub use seedance_core::{
    ApiErrorBody, ContentItem, DraftTaskRef, GenerationRequest, GenerationRequestBuilder,
    GenerationResponse, ImageRole, ImageUrl, Ratio, Resolution, ServiceTier, TaskStatus,
    ValidationReport, VideoGenerationRequest, VideoGenerationRequestBuilder,
    VideoGenerationResponse,
};
pub use seedance_error::{
    ApiErrorType, ConfigError, RetryableError, SeedanceError, SeedanceErrorKind, SeedanceResult,
    StatusCarrier, TransportError, TransportErrorKind, ValidationViolation, ViolationKind,
};
pub use seedance_retry::{RetryPolicy, retry_with_backoff};
