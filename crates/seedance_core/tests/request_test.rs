//! Tests for text generation request validation.

use seedance_core::GenerationRequest;
use seedance_error::{SeedanceErrorKind, ViolationKind};
use serde_json::json;

#[test]
fn test_defaults_and_trimming() -> Result<(), Box<dyn std::error::Error>> {
    let request = GenerationRequest::builder().prompt("  hello there \n").build()?;

    assert_eq!(request.prompt(), "hello there");
    assert_eq!(*request.max_tokens(), 100);
    assert_eq!(*request.temperature(), 0.7);
    assert_eq!(*request.top_p(), 1.0);
    assert_eq!(*request.n(), 1);
    assert!(!request.stream());
    assert!(request.model().is_none());
    assert!(!request.is_deterministic());
    Ok(())
}

#[test]
fn test_whitespace_prompt_rejected() {
    let err = GenerationRequest::builder().prompt("   \t ").build().unwrap_err();
    assert!(matches!(err.kind(), SeedanceErrorKind::Validation(_)));
    assert_eq!(err.violations()[0].kind, ViolationKind::Empty);
    assert_eq!(err.violations()[0].field, "prompt");
}

#[test]
fn test_missing_prompt_rejected() {
    let err = GenerationRequest::builder().build().unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Malformed);
}

#[test]
fn test_prompt_length_limit() {
    let long = "a".repeat(10_001);
    let err = GenerationRequest::builder().prompt(long).build().unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Length);

    let max = "a".repeat(10_000);
    assert!(GenerationRequest::builder().prompt(max).build().is_ok());
}

#[test]
fn test_model_pattern() {
    assert!(
        GenerationRequest::builder()
            .prompt("hi")
            .model("doubao-1.5_pro")
            .build()
            .is_ok()
    );

    let err = GenerationRequest::builder()
        .prompt("hi")
        .model("bad model/name")
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Pattern);
    assert_eq!(err.violations()[0].field, "model");
}

#[test]
fn test_numeric_ranges_are_all_reported() {
    let err = GenerationRequest::builder()
        .prompt("hi")
        .max_tokens(0u32)
        .temperature(2.5)
        .top_p(1.5)
        .n(11u32)
        .presence_penalty(-2.1)
        .frequency_penalty(3.0)
        .build()
        .unwrap_err();

    let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "max_tokens",
            "temperature",
            "top_p",
            "n",
            "presence_penalty",
            "frequency_penalty"
        ]
    );
    assert!(
        err.violations()
            .iter()
            .all(|v| v.kind == ViolationKind::OutOfRange)
    );
}

#[test]
fn test_nan_temperature_rejected() {
    let err = GenerationRequest::builder()
        .prompt("hi")
        .temperature(f64::NAN)
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].field, "temperature");
}

#[test]
fn test_stop_sequences() {
    let too_many = vec!["a".to_string(); 5];
    let err = GenerationRequest::builder()
        .prompt("hi")
        .stop(too_many)
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].field, "stop");

    let too_long = vec!["ok".to_string(), "x".repeat(101)];
    let err = GenerationRequest::builder()
        .prompt("hi")
        .stop(too_long)
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].field, "stop[1]");
}

#[test]
fn test_user_length() {
    let err = GenerationRequest::builder()
        .prompt("hi")
        .user("")
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].field, "user");
}

#[test]
fn test_extra_fields_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let request = GenerationRequest::from_json(json!({
        "prompt": "hi",
        "temperature": 0,
        "response_format": {"type": "json_object"},
        "seed": 7
    }))?;

    assert!(request.is_deterministic());
    assert_eq!(request.extra()["seed"], json!(7));

    let body = serde_json::to_value(&request)?;
    assert_eq!(body["response_format"], json!({"type": "json_object"}));
    assert_eq!(body["seed"], json!(7));
    assert_eq!(body["prompt"], json!("hi"));
    assert_eq!(body["max_tokens"], json!(100));
    assert!(body.get("model").is_none());

    let decoded: GenerationRequest = serde_json::from_value(body)?;
    assert_eq!(decoded, request);
    Ok(())
}

#[test]
fn test_builder_extra_cannot_shadow_known_fields() {
    let err = GenerationRequest::builder()
        .prompt("hi")
        .extra("prompt", "other")
        .build()
        .unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Malformed);
}

#[test]
fn test_from_json_validates() {
    let err = GenerationRequest::from_json(json!({"prompt": "hi", "n": 0})).unwrap_err();
    assert_eq!(err.violations()[0].field, "n");

    let err = GenerationRequest::from_json(json!({"prompt": 5})).unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Malformed);
}

#[test]
fn test_prompt_summary_truncates() -> Result<(), Box<dyn std::error::Error>> {
    let request = GenerationRequest::builder().prompt("x".repeat(80)).build()?;
    assert_eq!(request.prompt_summary(), format!("{}...", "x".repeat(50)));

    let short = GenerationRequest::builder().prompt("short").build()?;
    assert_eq!(short.prompt_summary(), "short");
    Ok(())
}
