//! Mapping of failures onto the API error taxonomy.

use seedance_core::{ApiErrorBody, GenerationResponse, VideoGenerationResponse};
use seedance_error::{
    ApiErrorType, SeedanceError, SeedanceErrorKind, TransportError, TransportErrorKind,
};
use tracing::error;

/// Stateless classifier turning failures into structured error bodies.
///
/// Precedence: local validation first, then the HTTP status, then the kind
/// of transport failure, then an "authentication" hint in the message, with
/// [`ApiErrorType::NetworkError`] as the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Category of an HTTP status.
    pub fn classify_status(status: u16) -> ApiErrorType {
        ApiErrorType::from_status(status)
    }

    /// Category of any client failure.
    pub fn classify(err: &SeedanceError) -> ApiErrorType {
        match err.kind() {
            SeedanceErrorKind::Validation(_)
            | SeedanceErrorKind::Config(_)
            | SeedanceErrorKind::Json(_) => ApiErrorType::ValidationError,
            SeedanceErrorKind::Transport(transport) => Self::classify_transport(transport),
        }
    }

    /// Category of a transport failure.
    pub fn classify_transport(err: &TransportError) -> ApiErrorType {
        if let Some(status) = err.status_code() {
            match Self::classify_status(status) {
                ApiErrorType::UnknownError => {}
                classified => return classified,
            }
        }

        match err.kind() {
            TransportErrorKind::Decode => return ApiErrorType::ValidationError,
            TransportErrorKind::Connect
            | TransportErrorKind::Timeout
            | TransportErrorKind::Request
            | TransportErrorKind::Body
            | TransportErrorKind::Build => return ApiErrorType::NetworkError,
            TransportErrorKind::Status => {}
        }

        let mentions_auth = |text: &str| text.to_lowercase().contains("authentication");
        if mentions_auth(err.message()) || err.body().is_some_and(mentions_auth) {
            return ApiErrorType::AuthenticationError;
        }

        ApiErrorType::NetworkError
    }

    /// Structured description of a failure, logged at error level.
    pub fn error_body(err: &SeedanceError, operation: &str) -> ApiErrorBody {
        let error_type = Self::classify(err);
        let (message, details, status_code) = match err.kind() {
            SeedanceErrorKind::Transport(transport) => (
                transport.to_string(),
                transport.body().map(str::to_string),
                transport.status_code(),
            ),
            other => (other.to_string(), None, None),
        };

        error!(
            operation,
            error_type = %error_type,
            status_code = ?status_code,
            error = %message,
            "API call failed"
        );

        let body = ApiErrorBody::new(error_type, message).with_status_code(status_code);
        match details {
            Some(details) => body.with_details(details),
            None => body,
        }
    }

    /// Text generation response describing a failure.
    pub fn to_response(err: &SeedanceError, operation: &str) -> GenerationResponse {
        GenerationResponse::from_error(Self::error_body(err, operation))
    }

    /// Video task response describing a failure.
    pub fn to_video_response(err: &SeedanceError, operation: &str) -> VideoGenerationResponse {
        VideoGenerationResponse::from_error(Self::error_body(err, operation))
    }

    /// Whether a classified failure is worth retrying.
    pub fn should_retry(body: &ApiErrorBody) -> bool {
        matches!(body.status_code, Some(500 | 502 | 503 | 504))
            || body.error_type == ApiErrorType::RateLimitError
    }
}
