//! Video generation task request.
//!
//! A task is described by an ordered list of [`ContentItem`]s (a text prompt,
//! images with a positional role, or a reference to an earlier draft task)
//! plus rendering parameters. The combination rules between items are checked
//! in one pass when the request is built.

use crate::request::{malformed, summarize};
use crate::validation::ValidationReport;
use derive_builder::Builder;
use derive_getters::Getters;
use seedance_error::{SeedanceError, SeedanceResult, ViolationKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How an image is used by the video model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    /// Opening frame of the video
    #[display("first_frame")]
    FirstFrame,
    /// Closing frame of the video
    #[display("last_frame")]
    LastFrame,
    /// Style or subject reference
    #[display("reference_image")]
    ReferenceImage,
}

/// Image location: a URL or a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Image URL or base64 payload
    pub url: String,
}

/// Reference to a previously generated draft task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTaskRef {
    /// Draft task identifier
    pub id: String,
}

/// One input item of a video generation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Text prompt describing the video
    Text {
        /// Prompt text
        text: String,
    },
    /// Input image with an optional role
    ImageUrl {
        /// Image location
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<ImageUrl>,
        /// Position or purpose of the image
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<ImageRole>,
    },
    /// Render the final video from a draft
    DraftTask {
        /// Draft reference
        draft_task: DraftTaskRef,
    },
}

impl ContentItem {
    /// Text prompt item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image item with an optional role.
    pub fn image(url: impl Into<String>, role: Option<ImageRole>) -> Self {
        Self::ImageUrl {
            image_url: Some(ImageUrl { url: url.into() }),
            role,
        }
    }

    /// Draft task reference item.
    pub fn draft_task(id: impl Into<String>) -> Self {
        Self::DraftTask {
            draft_task: DraftTaskRef { id: id.into() },
        }
    }

    /// Role of an image item, `None` for other items.
    pub fn role(&self) -> Option<ImageRole> {
        match self {
            Self::ImageUrl { role, .. } => *role,
            _ => None,
        }
    }
}

/// Inference tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    /// Online inference
    #[default]
    Default,
    /// Offline inference, cheaper and slower
    Flex,
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Resolution {
    /// 480p
    #[serde(rename = "480p")]
    #[display("480p")]
    P480,
    /// 720p
    #[serde(rename = "720p")]
    #[display("720p")]
    P720,
    /// 1080p
    #[serde(rename = "1080p")]
    #[display("1080p")]
    P1080,
}

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Ratio {
    /// 16:9
    #[serde(rename = "16:9")]
    #[display("16:9")]
    Widescreen,
    /// 4:3
    #[serde(rename = "4:3")]
    #[display("4:3")]
    Standard,
    /// 1:1
    #[serde(rename = "1:1")]
    #[display("1:1")]
    Square,
    /// 3:4
    #[serde(rename = "3:4")]
    #[display("3:4")]
    Portrait,
    /// 9:16
    #[serde(rename = "9:16")]
    #[display("9:16")]
    Vertical,
    /// 21:9
    #[serde(rename = "21:9")]
    #[display("21:9")]
    Ultrawide,
    /// Chosen by the model from the inputs
    #[serde(rename = "adaptive")]
    #[display("adaptive")]
    Adaptive,
}

const KNOWN_FIELDS: &[&str] = &[
    "model",
    "content",
    "callback_url",
    "return_last_frame",
    "service_tier",
    "execution_expires_after",
    "generate_audio",
    "draft",
    "resolution",
    "ratio",
    "duration",
    "frames",
    "seed",
    "camera_fixed",
    "watermark",
];

/// Validated video generation task request.
///
/// # Examples
///
/// ```
/// use seedance_core::{ContentItem, ImageRole, Resolution, VideoGenerationRequest};
///
/// let request = VideoGenerationRequest::builder()
///     .model("doubao-seedance-1-0-pro")
///     .content(vec![
///         ContentItem::image("https://example.com/first.jpg", Some(ImageRole::FirstFrame)),
///         ContentItem::text("The camera slowly pulls back"),
///     ])
///     .resolution(Resolution::P720)
///     .frames(121)
///     .build()?;
///
/// assert_eq!(*request.seed(), -1);
/// # Ok::<(), seedance_error::SeedanceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(try_from = "VideoGenerationRequestWire")]
#[builder(
    pattern = "owned",
    build_fn(private, name = "build_unvalidated"),
    setter(into)
)]
pub struct VideoGenerationRequest {
    /// Model identifier, stored trimmed
    model: String,
    /// Ordered inputs
    content: Vec<ContentItem>,
    /// URL notified when the task finishes
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<String>,
    /// Also return the final frame as an image
    #[builder(default)]
    return_last_frame: bool,
    /// Inference tier
    #[builder(default)]
    service_tier: ServiceTier,
    /// Seconds before an unfinished task expires
    #[builder(default = "172_800")]
    execution_expires_after: i64,
    /// Generate a soundtrack
    #[builder(default = "true")]
    generate_audio: bool,
    /// Produce a low-cost draft instead of a final render
    #[builder(default)]
    draft: bool,
    /// Output resolution
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<Resolution>,
    /// Output aspect ratio
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<Ratio>,
    /// Length in seconds; -1 lets the model choose
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    /// Frame count of the form 25 + 4n
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<i64>,
    /// Random seed; -1 picks one
    #[builder(default = "-1")]
    seed: i64,
    /// Keep the camera still
    #[builder(default)]
    camera_fixed: bool,
    /// Add a watermark
    #[builder(default)]
    watermark: bool,
    /// Fields not modelled here, passed through untouched
    #[builder(default, setter(custom))]
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Per-type and per-role counts gathered in one pass over the content list.
#[derive(Debug, Default)]
struct ContentTally {
    text: usize,
    image: usize,
    draft_task: usize,
    first_frame: usize,
    last_frame: usize,
    reference_image: usize,
}

impl ContentTally {
    fn of(items: &[ContentItem]) -> Self {
        let mut tally = Self::default();
        for item in items {
            match item {
                ContentItem::Text { .. } => tally.text += 1,
                ContentItem::DraftTask { .. } => tally.draft_task += 1,
                ContentItem::ImageUrl { role, .. } => {
                    tally.image += 1;
                    match role {
                        Some(ImageRole::FirstFrame) => tally.first_frame += 1,
                        Some(ImageRole::LastFrame) => tally.last_frame += 1,
                        Some(ImageRole::ReferenceImage) => tally.reference_image += 1,
                        None => {}
                    }
                }
            }
        }
        tally
    }
}

impl VideoGenerationRequest {
    /// Creates a new builder for VideoGenerationRequest.
    pub fn builder() -> VideoGenerationRequestBuilder {
        VideoGenerationRequestBuilder::default()
    }

    /// Decodes and validates a request from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the JSON has the wrong shape or any rule fails.
    pub fn from_json(value: Value) -> SeedanceResult<Self> {
        serde_json::from_value::<VideoGenerationRequestWire>(value)
            .map_err(|e| malformed("request", e))
            .and_then(Self::try_from)
    }

    /// Text of the first text item, if any.
    pub fn text_prompt(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ContentItem::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// First 50 characters of the text prompt, for log lines.
    pub fn prompt_summary(&self) -> String {
        self.text_prompt()
            .map(summarize)
            .unwrap_or_else(|| "No text content".to_string())
    }

    /// Whether the model id is tagged as a lite variant.
    pub fn is_lite_model(&self) -> bool {
        self.model.to_ascii_lowercase().contains("lite")
    }

    fn validate(self) -> SeedanceResult<Self> {
        let mut report = ValidationReport::new();

        self.check_fields(&mut report);

        let tally = ContentTally::of(&self.content);

        // Draft task exclusivity
        if tally.draft_task > 1 {
            report.add(
                ViolationKind::DuplicateDraftTask,
                "content",
                "Only one draft_task content item is allowed",
            );
        }
        if tally.draft_task > 0 && (tally.text > 0 || tally.image > 0) {
            report.add(
                ViolationKind::DraftTaskExclusive,
                "content",
                "draft_task cannot be combined with other content types",
            );
        }

        // Image roles
        if tally.first_frame > 0 && tally.reference_image > 0 {
            report.add(
                ViolationKind::RoleConflict,
                "content",
                "first_frame and reference_image roles cannot be mixed",
            );
        }
        if tally.first_frame > 1 {
            report.add(
                ViolationKind::DuplicateRole,
                "content",
                "Only one first_frame image is allowed",
            );
        }
        if tally.last_frame > 1 {
            report.add(
                ViolationKind::DuplicateRole,
                "content",
                "Only one last_frame image is allowed",
            );
        }
        if tally.last_frame > 0 && tally.first_frame == 0 {
            report.add(
                ViolationKind::LastFrameWithoutFirst,
                "content",
                "last_frame requires a corresponding first_frame",
            );
        }

        if self.camera_fixed && tally.reference_image > 0 {
            report.add(
                ViolationKind::CameraFixedWithReference,
                "camera_fixed",
                "camera_fixed is not supported together with reference_image content",
            );
        }

        if self.is_lite_model()
            && self.resolution == Some(Resolution::P1080)
            && tally.reference_image > 0
        {
            report.add(
                ViolationKind::LiteResolution,
                "resolution",
                format!(
                    "model {} does not support 1080p with reference images",
                    self.model
                ),
            );
        }

        if let Some(frames) = self.frames {
            if !(29..=289).contains(&frames) {
                report.add(
                    ViolationKind::FramePattern,
                    "frames",
                    format!("Frames must be between 29 and 289, got {}", frames),
                );
            } else if (frames - 25) % 4 != 0 {
                report.add(
                    ViolationKind::FramePattern,
                    "frames",
                    format!("Frames must follow the pattern 25 + 4n, got {}", frames),
                );
            }
        }

        if let Some(duration) = self.duration
            && duration != -1
            && !(2..=12).contains(&duration)
        {
            report.add(
                ViolationKind::DurationRange,
                "duration",
                format!(
                    "Duration must be -1 or between 2 and 12 seconds, got {}",
                    duration
                ),
            );
        }

        report.into_result(self)
    }

    fn check_fields(&self, report: &mut ValidationReport) {
        if self.model.is_empty() {
            report.add(ViolationKind::Empty, "model", "Model cannot be empty");
        } else {
            report.check_chars("model", &self.model, 1, 256);
        }

        report.check_items("content", self.content.len(), 1, 10);
        for (i, item) in self.content.iter().enumerate() {
            match item {
                ContentItem::Text { text } => {
                    report.check_chars(&format!("content[{}].text", i), text, 1, 5_000);
                }
                ContentItem::ImageUrl { image_url, .. } => match image_url {
                    Some(image) => {
                        report.check_chars(&format!("content[{}].image_url.url", i), &image.url, 1, 2_048);
                    }
                    None => report.add(
                        ViolationKind::Empty,
                        format!("content[{}].image_url", i),
                        "image_url is required for image content",
                    ),
                },
                ContentItem::DraftTask { draft_task } => {
                    report.check_chars(&format!("content[{}].draft_task.id", i), &draft_task.id, 1, 128);
                }
            }
        }

        if let Some(url) = &self.callback_url {
            report.check_chars("callback_url", url, 0, 2_048);
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                report.add(
                    ViolationKind::CallbackScheme,
                    "callback_url",
                    "Callback URL must start with http:// or https://",
                );
            }
        }

        report.check_range(
            "execution_expires_after",
            self.execution_expires_after,
            3_600,
            259_200,
        );
        report.check_range("seed", self.seed, -1, 4_294_967_295);

        for key in self.extra.keys() {
            if KNOWN_FIELDS.contains(&key.as_str()) {
                report.add(
                    ViolationKind::Malformed,
                    key.clone(),
                    format!("extra field `{}` shadows a known field", key),
                );
            }
        }
    }
}

impl VideoGenerationRequestBuilder {
    /// Appends one content item.
    pub fn push_content(mut self, item: ContentItem) -> Self {
        self.content.get_or_insert_with(Vec::new).push(item);
        self
    }

    /// Adds a field the API accepts but this model does not know about.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds and validates the request.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every violated rule, in rule order.
    pub fn build(self) -> SeedanceResult<VideoGenerationRequest> {
        let mut request = self
            .build_unvalidated()
            .map_err(|e| malformed("request", e))?;
        request.model = request.model.trim().to_string();
        request.validate()
    }
}

/// Wire shape accepted when decoding a request from JSON.
#[derive(Debug, Deserialize)]
struct VideoGenerationRequestWire {
    model: String,
    content: Vec<ContentItem>,
    #[serde(default)]
    callback_url: Option<String>,
    #[serde(default)]
    return_last_frame: Option<bool>,
    #[serde(default)]
    service_tier: Option<ServiceTier>,
    #[serde(default)]
    execution_expires_after: Option<i64>,
    #[serde(default)]
    generate_audio: Option<bool>,
    #[serde(default)]
    draft: Option<bool>,
    #[serde(default)]
    resolution: Option<Resolution>,
    #[serde(default)]
    ratio: Option<Ratio>,
    #[serde(default)]
    duration: Option<i64>,
    #[serde(default)]
    frames: Option<i64>,
    #[serde(default)]
    seed: Option<i64>,
    #[serde(default)]
    camera_fixed: Option<bool>,
    #[serde(default)]
    watermark: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<VideoGenerationRequestWire> for VideoGenerationRequest {
    type Error = SeedanceError;

    fn try_from(wire: VideoGenerationRequestWire) -> Result<Self, Self::Error> {
        let builder = VideoGenerationRequestBuilder {
            model: Some(wire.model),
            content: Some(wire.content),
            callback_url: wire.callback_url.map(Some),
            return_last_frame: wire.return_last_frame,
            service_tier: wire.service_tier,
            execution_expires_after: wire.execution_expires_after,
            generate_audio: wire.generate_audio,
            draft: wire.draft,
            resolution: wire.resolution.map(Some),
            ratio: wire.ratio.map(Some),
            duration: wire.duration.map(Some),
            frames: wire.frames.map(Some),
            seed: wire.seed,
            camera_fixed: wire.camera_fixed,
            watermark: wire.watermark,
            extra: Some(wire.extra),
        };
        builder.build()
    }
}
