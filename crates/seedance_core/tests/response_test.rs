//! Tests for response decoding.

use seedance_core::{ApiErrorBody, GenerationResponse, TaskStatus, VideoGenerationResponse};
use seedance_error::{ApiErrorType, StatusCarrier, ViolationKind};
use serde_json::json;

#[test]
fn test_generation_response_keeps_unknown_fields() -> Result<(), Box<dyn std::error::Error>> {
    let response = GenerationResponse::from_json(json!({
        "id": "gen-123.a_b",
        "object": "text_completion",
        "created": 1_700_000_000,
        "model": "m1",
        "choices": [{"text": "hello", "index": 0}],
        "usage": {"total_tokens": 12},
        "system_fingerprint": "fp_1"
    }))?;

    assert_eq!(response.id().as_deref(), Some("gen-123.a_b"));
    assert_eq!(response.choices().as_ref().map(Vec::len), Some(1));
    assert_eq!(response.extra_field("system_fingerprint"), Some(&json!("fp_1")));
    assert!(!response.is_error());
    assert_eq!(response.status_code(), None);

    let encoded = serde_json::to_value(&response)?;
    assert_eq!(encoded["system_fingerprint"], json!("fp_1"));
    Ok(())
}

#[test]
fn test_generation_response_validation() {
    let err = GenerationResponse::from_json(json!({"id": "bad id!"})).unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Pattern);

    let choices: Vec<_> = (0..11).map(|i| json!({"index": i})).collect();
    let err = GenerationResponse::from_json(json!({"choices": choices, "created": -1})).unwrap_err();
    assert_eq!(err.violations().len(), 2);

    let err = GenerationResponse::from_json(json!(["not", "an", "object"])).unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Malformed);
}

#[test]
fn test_error_response_carries_status() {
    let response = GenerationResponse::from_error(
        ApiErrorBody::new(ApiErrorType::ServerError, "Service Unavailable")
            .with_details("upstream busy")
            .with_status_code(Some(503)),
    );

    assert!(response.is_error());
    assert_eq!(response.status_code(), Some(503));

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(
        body,
        json!({"error": {
            "type": "server_error",
            "message": "Service Unavailable",
            "details": "upstream busy",
            "status_code": 503
        }})
    );
}

#[test]
fn test_error_body_with_unknown_type() -> Result<(), Box<dyn std::error::Error>> {
    let response = GenerationResponse::from_json(json!({
        "error": {"type": "quota_exceeded", "message": "out of credit"}
    }))?;
    let error = response.error().as_ref().unwrap();
    assert_eq!(error.error_type, ApiErrorType::UnknownError);
    assert_eq!(error.message, "out of credit");
    Ok(())
}

#[test]
fn test_video_response_status() -> Result<(), Box<dyn std::error::Error>> {
    let response = VideoGenerationResponse::from_json(json!({
        "id": "cgt-2025",
        "status": "succeeded",
        "video_url": "https://cdn.example.com/v.mp4",
        "duration": 5.0,
        "usage": {"completion_tokens": 108900}
    }))?;

    assert_eq!(response.id().as_deref(), Some("cgt-2025"));
    assert_eq!(*response.status(), Some(TaskStatus::Succeeded));
    assert!(response.status().as_ref().is_some_and(TaskStatus::is_terminal));
    assert!(response.extra_field("usage").is_some());

    let pending = VideoGenerationResponse::from_json(json!({"id": "t", "status": "paused"}))?;
    assert_eq!(*pending.status(), Some(TaskStatus::Other("paused".to_string())));
    assert!(!pending.status().as_ref().is_some_and(TaskStatus::is_terminal));
    Ok(())
}

#[test]
fn test_video_response_requires_id_on_success() {
    let err = VideoGenerationResponse::from_json(json!({"status": "queued"})).unwrap_err();
    assert_eq!(err.violations()[0].field, "id");
}
