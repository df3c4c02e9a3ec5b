//! Request validation violations.

use derive_more::Display;

/// Rule a request field or field combination failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ViolationKind {
    /// A numeric field is outside its allowed range.
    #[display("out of range")]
    OutOfRange,
    /// A string or list is shorter or longer than allowed.
    #[display("invalid length")]
    Length,
    /// A string does not match its required pattern.
    #[display("pattern mismatch")]
    Pattern,
    /// A required string is empty or only whitespace.
    #[display("empty")]
    Empty,
    /// Input that could not be decoded into the expected shape.
    #[display("malformed")]
    Malformed,
    /// A callback URL without an http(s) scheme.
    #[display("invalid scheme")]
    CallbackScheme,
    /// More than one draft task item.
    #[display("duplicate draft task")]
    DuplicateDraftTask,
    /// A draft task combined with text or image items.
    #[display("draft task not exclusive")]
    DraftTaskExclusive,
    /// first_frame and reference_image used together.
    #[display("role conflict")]
    RoleConflict,
    /// More than one first_frame or last_frame image.
    #[display("duplicate role")]
    DuplicateRole,
    /// A last_frame image without a first_frame image.
    #[display("last frame without first frame")]
    LastFrameWithoutFirst,
    /// camera_fixed set together with reference images.
    #[display("camera fixed with reference image")]
    CameraFixedWithReference,
    /// 1080p with reference images on a lite model.
    #[display("unsupported resolution for lite model")]
    LiteResolution,
    /// frames outside [29, 289] or not of the form 25 + 4n.
    #[display("invalid frame count")]
    FramePattern,
    /// duration neither -1 nor within [2, 12].
    #[display("invalid duration")]
    DurationRange,
}

/// One failed rule, with the offending field path and a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{field}: {message}")]
pub struct ValidationViolation {
    /// Rule that failed
    pub kind: ViolationKind,
    /// Field path, e.g. `content[1].role`
    pub field: String,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationViolation {
    /// Create a violation for `field`.
    pub fn new(kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}
