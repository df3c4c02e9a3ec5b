//! Raw transport failures.

use derive_more::Display;

/// What went wrong below the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    #[display("connection failed")]
    Connect,
    /// The per-request deadline elapsed.
    #[display("request timed out")]
    Timeout,
    /// The server answered with a non-2xx status.
    #[display("HTTP status error")]
    Status,
    /// The response body could not be read.
    #[display("response body read failed")]
    Body,
    /// The response body was not valid JSON for the expected shape.
    #[display("response decode failed")]
    Decode,
    /// The request could not be sent for another reason.
    #[display("request failed")]
    Request,
    /// The request could not be built, for example because the URL is invalid.
    #[display("request build failed")]
    Build,
}

impl TransportErrorKind {
    /// Connection-level failures expected to clear up on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect | Self::Timeout | Self::Request)
    }
}

/// A transport failure with optional HTTP context and source location.
#[derive(Debug, Clone, Display)]
#[display("{kind}: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    status_code: Option<u16>,
    body: Option<String>,
    line: u32,
    file: &'static str,
}

impl TransportError {
    /// Create a transport failure at the current location.
    #[track_caller]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            status_code: None,
            body: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a failure for a non-2xx response.
    #[track_caller]
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        let mut err = Self::new(
            TransportErrorKind::Status,
            format!("server responded with status {}", status_code),
        );
        err.status_code = Some(status_code);
        err.body = Some(body.into());
        err
    }

    /// Attach the HTTP status observed alongside this failure.
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Attach response body text for diagnostics.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Kind of failure.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when a response was received.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Response body text, when a response was received.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Line where the failure was recorded.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the failure was recorded.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

impl std::error::Error for TransportError {}
