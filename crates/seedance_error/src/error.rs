//! Top-level error for the client.

use crate::{ConfigError, TransportError, ValidationViolation};
use derive_more::Display;

/// Error conditions surfaced by thrown failures.
///
/// Classified API failures are not represented here; they come back as
/// structured error responses.
#[derive(Debug, Clone)]
pub enum SeedanceErrorKind {
    /// Client construction failed.
    Config(ConfigError),
    /// Local request validation failed with one or more violations.
    Validation(Vec<ValidationViolation>),
    /// Transport failure that persisted through every retry.
    Transport(TransportError),
    /// Serialization of a request body failed.
    Json(String),
}

impl std::fmt::Display for SeedanceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedanceErrorKind::Config(err) => write!(f, "{}", err),
            SeedanceErrorKind::Validation(violations) => {
                write!(f, "Validation failed: ")?;
                for (i, violation) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", violation)?;
                }
                Ok(())
            }
            SeedanceErrorKind::Transport(err) => write!(f, "Transport error: {}", err),
            SeedanceErrorKind::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl From<ConfigError> for SeedanceErrorKind {
    fn from(err: ConfigError) -> Self {
        SeedanceErrorKind::Config(err)
    }
}

impl From<TransportError> for SeedanceErrorKind {
    fn from(err: TransportError) -> Self {
        SeedanceErrorKind::Transport(err)
    }
}

/// Client error with location tracking.
///
/// # Examples
///
/// ```
/// use seedance_error::{ConfigError, SeedanceError, SeedanceErrorKind};
///
/// let err = SeedanceError::from(ConfigError::new("API key is required"));
/// assert!(matches!(err.kind(), SeedanceErrorKind::Config(_)));
/// assert!(err.to_string().contains("API key is required"));
/// ```
#[derive(Debug, Clone, Display, derive_more::Error)]
#[display("Seedance Error: {} at line {} in {}", kind, line, file)]
pub struct SeedanceError {
    kind: SeedanceErrorKind,
    line: u32,
    file: &'static str,
}

impl SeedanceError {
    /// Create a new error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SeedanceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a validation failure.
    #[track_caller]
    pub fn validation(violations: Vec<ValidationViolation>) -> Self {
        Self::new(SeedanceErrorKind::Validation(violations))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SeedanceErrorKind {
        &self.kind
    }

    /// Line where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Validation violations, if this is a validation failure.
    pub fn violations(&self) -> &[ValidationViolation] {
        match &self.kind {
            SeedanceErrorKind::Validation(v) => v,
            _ => &[],
        }
    }
}

impl<T> From<T> for SeedanceError
where
    T: Into<SeedanceErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result alias for client operations.
pub type SeedanceResult<T> = Result<T, SeedanceError>;

/// Errors that know whether they warrant another attempt.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Connection failures and timeouts are retryable; configuration and
    /// validation failures never are.
    fn is_retryable(&self) -> bool;

    /// HTTP status associated with the failure, if one was observed.
    fn status_code(&self) -> Option<u16> {
        None
    }
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        self.kind().is_transient()
    }

    fn status_code(&self) -> Option<u16> {
        TransportError::status_code(self)
    }
}

impl RetryableError for SeedanceError {
    fn is_retryable(&self) -> bool {
        match &self.kind {
            SeedanceErrorKind::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn status_code(&self) -> Option<u16> {
        match &self.kind {
            SeedanceErrorKind::Transport(err) => err.status_code(),
            _ => None,
        }
    }
}

/// Values that may carry an HTTP status code, such as error responses.
///
/// The retry controller uses this to decide whether a returned value, not
/// just a thrown error, should be retried.
pub trait StatusCarrier {
    /// Status code carried by the value, if any.
    fn status_code(&self) -> Option<u16>;
}
