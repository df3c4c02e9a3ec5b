//! Response models.
//!
//! Responses are permissive: fields the API adds later are kept in `extra`
//! instead of being dropped, and every modelled field is optional.

use crate::request::malformed;
use crate::validation::{ValidationReport, is_identifier};
use derive_getters::Getters;
use seedance_error::{ApiErrorType, SeedanceResult, StatusCarrier, ViolationKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured description of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Failure category
    #[serde(rename = "type", default)]
    pub error_type: ApiErrorType,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Raw details, usually the response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// HTTP status, when a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiErrorBody {
    /// Error body with no details or status.
    pub fn new(error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            details: None,
            status_code: None,
        }
    }

    /// Attaches raw details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attaches the HTTP status.
    pub fn with_status_code(mut self, status_code: Option<u16>) -> Self {
        self.status_code = status_code;
        self
    }
}

/// Text generation or model listing response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct GenerationResponse {
    /// Response identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// Object type tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    /// Unix creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<i64>,
    /// Model that produced the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    /// Generated choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    choices: Option<Vec<Value>>,
    /// Token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usage: Option<Map<String, Value>>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ApiErrorBody>,
    /// Fields not modelled here
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl GenerationResponse {
    /// Decodes and validates a response body.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the body is not an object of the expected
    /// shape, the id is not an identifier, `created` is negative, or there are
    /// more than 10 choices.
    pub fn from_json(value: Value) -> SeedanceResult<Self> {
        let response: Self =
            serde_json::from_value(value).map_err(|e| malformed("response", e))?;

        let mut report = ValidationReport::new();
        if let Some(id) = &response.id
            && !is_identifier(id)
        {
            report.add(
                ViolationKind::Pattern,
                "id",
                "ID can only contain alphanumeric characters, hyphens, underscores, and dots",
            );
        }
        if let Some(created) = response.created
            && created < 0
        {
            report.add(ViolationKind::OutOfRange, "created", "created must be non-negative");
        }
        if let Some(choices) = &response.choices {
            report.check_items("choices", choices.len(), 0, 10);
        }
        report.into_result(response)
    }

    /// Response carrying only an error.
    pub fn from_error(error: ApiErrorBody) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Returns true if the response describes a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Value of an unmodelled field.
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl StatusCarrier for GenerationResponse {
    fn status_code(&self) -> Option<u16> {
        self.error.as_ref().and_then(|e| e.status_code)
    }
}

/// Lifecycle state of a video generation task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to start
    Queued,
    /// Rendering
    Running,
    /// Video available
    Succeeded,
    /// Rendering failed
    Failed,
    /// Expired before completion
    Expired,
    /// Status this client does not know yet
    #[serde(untagged)]
    Other(String),
}

impl TaskStatus {
    /// Returns true once the task will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Expired)
    }
}

/// Video generation task response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct VideoGenerationResponse {
    /// Task identifier, absent on error responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// Request identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    /// Response code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<i64>,
    /// Response message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
    /// Task details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_info: Option<Map<String, Value>>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ApiErrorBody>,
    /// Task state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<TaskStatus>,
    /// Generated video location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    /// Container format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_format: Option<String>,
    /// Length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    /// Rendered resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    /// Rendered aspect ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ratio: Option<String>,
    /// Final frame image, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_frame_url: Option<String>,
    /// Model that rendered the video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_used: Option<String>,
    /// Billing information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost: Option<Map<String, Value>>,
    /// Rendering time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execution_time: Option<i64>,
    /// Fields not modelled here
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl VideoGenerationResponse {
    /// Decodes a task response body.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the body is not an object of the expected
    /// shape or a successful body lacks the task id.
    pub fn from_json(value: Value) -> SeedanceResult<Self> {
        let response: Self =
            serde_json::from_value(value).map_err(|e| malformed("response", e))?;

        let mut report = ValidationReport::new();
        if response.id.is_none() && response.error.is_none() {
            report.add(ViolationKind::Empty, "id", "task id is missing");
        }
        report.into_result(response)
    }

    /// Response carrying only an error.
    pub fn from_error(error: ApiErrorBody) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Returns true if the response describes a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Value of an unmodelled field.
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl StatusCarrier for VideoGenerationResponse {
    fn status_code(&self) -> Option<u16> {
        self.error.as_ref().and_then(|e| e.status_code)
    }
}
