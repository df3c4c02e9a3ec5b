//! Text generation request.

use crate::validation::{ValidationReport, is_identifier};
use derive_builder::Builder;
use derive_getters::Getters;
use seedance_error::{SeedanceError, SeedanceResult, ViolationKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const KNOWN_FIELDS: &[&str] = &[
    "prompt",
    "model",
    "max_tokens",
    "temperature",
    "top_p",
    "n",
    "stream",
    "stop",
    "presence_penalty",
    "frequency_penalty",
    "logit_bias",
    "user",
];

/// Validated text generation request.
///
/// Instances only exist after every field and cross-field rule passed; see
/// [`GenerationRequestBuilder::build`]. Unknown fields supplied through
/// [`GenerationRequestBuilder::extra`] or present in decoded JSON are kept and
/// sent along with the request.
///
/// # Examples
///
/// ```
/// use seedance_core::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .prompt("  Describe a sunrise  ")
///     .model("doubao-seed-1.6")
///     .temperature(0.0)
///     .build()?;
///
/// assert_eq!(request.prompt(), "Describe a sunrise");
/// assert_eq!(*request.max_tokens(), 100);
/// # Ok::<(), seedance_error::SeedanceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(try_from = "GenerationRequestWire")]
#[builder(
    pattern = "owned",
    build_fn(private, name = "build_unvalidated"),
    setter(into)
)]
pub struct GenerationRequest {
    /// Input prompt, stored trimmed
    prompt: String,
    /// Model identifier
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    /// Maximum tokens to generate
    #[builder(default = "100")]
    max_tokens: u32,
    /// Sampling temperature
    #[builder(default = "0.7")]
    temperature: f64,
    /// Nucleus sampling mass
    #[builder(default = "1.0")]
    top_p: f64,
    /// Number of completions
    #[builder(default = "1")]
    n: u32,
    /// Stream the response
    #[builder(default)]
    stream: bool,
    /// Stop sequences
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    /// Presence penalty
    #[builder(default)]
    presence_penalty: f64,
    /// Frequency penalty
    #[builder(default)]
    frequency_penalty: f64,
    /// Per-token likelihood adjustments
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    logit_bias: Option<BTreeMap<String, f64>>,
    /// End-user identifier
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    /// Fields not modelled here, passed through untouched
    #[builder(default, setter(custom))]
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl GenerationRequest {
    /// Creates a new builder for GenerationRequest.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Decodes and validates a request from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the JSON has the wrong shape or any rule fails.
    pub fn from_json(value: Value) -> SeedanceResult<Self> {
        serde_json::from_value::<GenerationRequestWire>(value)
            .map_err(|e| malformed("request", e))
            .and_then(Self::try_from)
    }

    /// Whether identical requests are expected to produce identical output.
    pub fn is_deterministic(&self) -> bool {
        self.temperature == 0.0
    }

    /// First 50 characters of the prompt, for log lines.
    pub fn prompt_summary(&self) -> String {
        summarize(&self.prompt)
    }

    fn validate(self) -> SeedanceResult<Self> {
        let mut report = ValidationReport::new();

        if self.prompt.is_empty() {
            report.add(
                ViolationKind::Empty,
                "prompt",
                "Prompt cannot be empty or just whitespace",
            );
        } else {
            report.check_chars("prompt", &self.prompt, 1, 10_000);
        }

        if let Some(model) = &self.model
            && !is_identifier(model)
        {
            report.add(
                ViolationKind::Pattern,
                "model",
                "Model name can only contain alphanumeric characters, hyphens, underscores, and dots",
            );
        }

        report.check_range("max_tokens", self.max_tokens, 1, 10_000);
        report.check_range("temperature", self.temperature, 0.0, 2.0);
        report.check_range("top_p", self.top_p, 0.0, 1.0);
        report.check_range("n", self.n, 1, 10);
        report.check_range("presence_penalty", self.presence_penalty, -2.0, 2.0);
        report.check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0);

        if let Some(stop) = &self.stop {
            report.check_items("stop", stop.len(), 0, 4);
            for (i, sequence) in stop.iter().enumerate() {
                if sequence.chars().count() > 100 {
                    report.add(
                        ViolationKind::Length,
                        format!("stop[{}]", i),
                        "Stop sequences must be at most 100 characters",
                    );
                }
            }
        }

        if let Some(user) = &self.user {
            report.check_chars("user", user, 1, 256);
        }

        for key in self.extra.keys() {
            if KNOWN_FIELDS.contains(&key.as_str()) {
                report.add(
                    ViolationKind::Malformed,
                    key.clone(),
                    format!("extra field `{}` shadows a known field", key),
                );
            }
        }

        report.into_result(self)
    }
}

impl GenerationRequestBuilder {
    /// Adds a field the API accepts but this model does not know about.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds and validates the request.
    ///
    /// The prompt is trimmed before validation. All violations are collected
    /// before failing.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every violated rule.
    pub fn build(self) -> SeedanceResult<GenerationRequest> {
        let mut request = self
            .build_unvalidated()
            .map_err(|e| malformed("prompt", e))?;
        request.prompt = request.prompt.trim().to_string();
        request.validate()
    }
}

/// Wire shape accepted when decoding a request from JSON.
#[derive(Debug, Deserialize)]
struct GenerationRequestWire {
    prompt: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    top_p: Option<f64>,
    #[serde(default)]
    n: Option<u32>,
    #[serde(default)]
    stream: Option<bool>,
    #[serde(default)]
    stop: Option<Vec<String>>,
    #[serde(default)]
    presence_penalty: Option<f64>,
    #[serde(default)]
    frequency_penalty: Option<f64>,
    #[serde(default)]
    logit_bias: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    user: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<GenerationRequestWire> for GenerationRequest {
    type Error = SeedanceError;

    fn try_from(wire: GenerationRequestWire) -> Result<Self, Self::Error> {
        let mut builder = GenerationRequestBuilder {
            extra: Some(wire.extra),
            ..GenerationRequestBuilder::default()
        }
        .prompt(wire.prompt);

        if let Some(model) = wire.model {
            builder = builder.model(model);
        }
        if let Some(max_tokens) = wire.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = wire.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(top_p) = wire.top_p {
            builder = builder.top_p(top_p);
        }
        if let Some(n) = wire.n {
            builder = builder.n(n);
        }
        if let Some(stream) = wire.stream {
            builder = builder.stream(stream);
        }
        if let Some(stop) = wire.stop {
            builder = builder.stop(stop);
        }
        if let Some(penalty) = wire.presence_penalty {
            builder = builder.presence_penalty(penalty);
        }
        if let Some(penalty) = wire.frequency_penalty {
            builder = builder.frequency_penalty(penalty);
        }
        if let Some(bias) = wire.logit_bias {
            builder = builder.logit_bias(bias);
        }
        if let Some(user) = wire.user {
            builder = builder.user(user);
        }

        builder.build()
    }
}

#[track_caller]
pub(crate) fn malformed(field: &str, err: impl std::fmt::Display) -> SeedanceError {
    SeedanceError::validation(vec![seedance_error::ValidationViolation::new(
        ViolationKind::Malformed,
        field,
        err.to_string(),
    )])
}

pub(crate) fn summarize(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(50).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
