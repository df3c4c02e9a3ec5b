//! Request and response models for the Seedance/Volces API.
//!
//! Requests are validated when they are built: a [`GenerationRequest`] or
//! [`VideoGenerationRequest`] value is always valid. Validation is pure and
//! reports every violated rule at once through
//! [`seedance_error::SeedanceErrorKind::Validation`].

mod request;
mod response;
mod validation;
mod video;

pub use request::{GenerationRequest, GenerationRequestBuilder};
pub use response::{ApiErrorBody, GenerationResponse, TaskStatus, VideoGenerationResponse};
pub use validation::{ValidationReport, is_identifier};
pub use video::{
    ContentItem, DraftTaskRef, ImageRole, ImageUrl, Ratio, Resolution, ServiceTier,
    VideoGenerationRequest, VideoGenerationRequestBuilder,
};
