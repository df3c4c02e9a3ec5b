//! HTTP-level tests for VolcesClient against a mock server.

use seedance_client::{ClientConfig, VolcesClient};
use seedance_core::{ContentItem, GenerationRequest, ImageRole, TaskStatus, VideoGenerationRequest};
use seedance_error::{ApiErrorType, SeedanceErrorKind, TransportErrorKind};
use seedance_retry::RetryPolicy;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key-123";

fn fast_retry() -> RetryPolicy {
    RetryPolicy::default()
        .with_backoff_factor(0.0)
        .with_max_jitter(Duration::ZERO)
}

fn client_for(base_url: impl Into<String>) -> VolcesClient {
    let config = ClientConfig::builder()
        .api_key(API_KEY)
        .base_url(base_url)
        .retry(fast_retry())
        .build()
        .expect("valid config");
    VolcesClient::new(config).expect("client builds")
}

fn deterministic_request() -> GenerationRequest {
    GenerationRequest::builder()
        .prompt("hi")
        .model("m1")
        .temperature(0.0)
        .build()
        .expect("valid request")
}

#[tokio::test]
async fn test_generate_sends_authenticated_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("Authorization", format!("Bearer {}", API_KEY).as_str()))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({"prompt": "hi", "model": "m1", "max_tokens": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g1",
            "object": "text_completion",
            "choices": [{"text": "hello", "index": 0}],
            "usage": {"total_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client
        .generate(&deterministic_request())
        .await
        .expect("call succeeds");

    assert!(!response.is_error());
    assert_eq!(response.id().as_deref(), Some("g1"));
    assert_eq!(response.usage().as_ref().map(|u| u["total_tokens"].clone()), Some(json!(3)));
}

#[tokio::test]
async fn test_deterministic_request_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "g1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let request = deterministic_request();

    let first = client.generate(&request).await.expect("first call");
    let second = client.generate(&request).await.expect("second call");

    assert_eq!(first.id().as_deref(), Some("g1"));
    assert_eq!(second, first);
    assert_eq!(client.cache().len(), 1);

    let stats = *client.metrics().operation("generate").expect("recorded");
    assert_eq!(*stats.calls(), 2);
    assert_eq!(*stats.failures(), 0);
}

#[tokio::test]
async fn test_sampled_request_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "g1"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let request = GenerationRequest::builder()
        .prompt("hi")
        .temperature(0.9)
        .build()
        .expect("valid request");

    client.generate(&request).await.expect("first call");
    client.generate(&request).await.expect("second call");
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_server_error_is_retried_then_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client
        .generate(&deterministic_request())
        .await
        .expect("classified failures are returned, not raised");

    let error = response.error().as_ref().expect("error body");
    assert_eq!(error.error_type, ApiErrorType::ServerError);
    assert_eq!(error.status_code, Some(503));
    assert_eq!(error.details.as_deref(), Some("Service Unavailable"));

    // Error responses are never cached
    assert!(client.cache().is_empty());
    assert_eq!(*client.metrics().operation("generate").expect("recorded").failures(), 1);
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client
        .generate(&deterministic_request())
        .await
        .expect("structured response");

    let error = response.error().as_ref().expect("error body");
    assert_eq!(error.error_type, ApiErrorType::AuthenticationError);
    assert_eq!(error.status_code, Some(401));
}

#[tokio::test]
async fn test_rate_limit_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(2)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .retry(fast_retry().with_max_retries(1))
        .build()
        .expect("valid config");
    let client = VolcesClient::new(config).expect("client builds");

    let response = client.list_models().await.expect("structured response");
    let error = response.error().as_ref().expect("error body");
    assert_eq!(error.error_type, ApiErrorType::RateLimitError);
    assert_eq!(error.status_code, Some(429));
}

#[tokio::test]
async fn test_not_found_is_a_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client.list_models().await.expect("structured response");
    assert_eq!(
        response.error().as_ref().map(|e| e.error_type),
        Some(ApiErrorType::ValidationError)
    );
}

#[tokio::test]
async fn test_invalid_json_is_a_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client
        .generate(&deterministic_request())
        .await
        .expect("structured response");

    let error = response.error().as_ref().expect("error body");
    assert_eq!(error.error_type, ApiErrorType::ValidationError);
    assert_eq!(error.status_code, None);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_connection_failure_propagates_after_retries() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let client = client_for(format!("http://{}", address));
    let err = client
        .generate(&deterministic_request())
        .await
        .expect_err("persistent connection failure is raised");

    match err.kind() {
        SeedanceErrorKind::Transport(transport) => {
            assert_eq!(transport.kind(), TransportErrorKind::Connect);
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert_eq!(*client.metrics().operation("generate").expect("recorded").failures(), 1);
}

#[tokio::test]
async fn test_body_timeout_is_retried_then_raised() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{";
                let _ = socket.write_all(head.as_bytes()).await;
                tokio::time::sleep(Duration::from_secs(5)).await;
            });
        }
    });

    let config = ClientConfig::builder()
        .api_key(API_KEY)
        .base_url(format!("http://{}", address))
        .timeout(Duration::from_millis(200))
        .retry(fast_retry().with_max_retries(1))
        .build()
        .expect("valid config");
    let client = VolcesClient::new(config).expect("client builds");

    let err = client
        .generate(&deterministic_request())
        .await
        .expect_err("stalled body is raised");

    match err.kind() {
        SeedanceErrorKind::Transport(transport) => {
            assert_eq!(transport.kind(), TransportErrorKind::Timeout);
            assert_eq!(transport.status_code(), None);
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_list_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "doubao-seedance-1-0-pro"}, {"id": "doubao-seedance-1-0-lite-t2v"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client.list_models().await.expect("call succeeds");

    assert_eq!(response.object().as_deref(), Some("list"));
    let models = response.extra_field("data").and_then(|d| d.as_array()).expect("model list");
    assert_eq!(models.len(), 2);
}

#[tokio::test]
async fn test_create_video_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contents/generations/tasks"))
        .and(body_partial_json(json!({
            "model": "doubao-seedance-1-0-pro",
            "content": [
                {"type": "image_url", "image_url": {"url": "https://example.com/a.jpg"}, "role": "first_frame"},
                {"type": "text", "text": "The camera pulls back"}
            ],
            "frames": 121
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cgt-2025-abc"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let request = VideoGenerationRequest::builder()
        .model("doubao-seedance-1-0-pro")
        .push_content(ContentItem::image("https://example.com/a.jpg", Some(ImageRole::FirstFrame)))
        .push_content(ContentItem::text("The camera pulls back"))
        .frames(121)
        .build()
        .expect("valid request");

    // Video tasks are never cached
    for _ in 0..2 {
        let response = client.create_video_task(&request).await.expect("call succeeds");
        assert_eq!(response.id().as_deref(), Some("cgt-2025-abc"));
    }
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_get_video_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contents/generations/tasks/cgt-2025-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cgt-2025-abc",
            "status": "succeeded",
            "video_url": "https://cdn.example.com/video.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let response = client.get_video_task("cgt-2025-abc").await.expect("call succeeds");

    assert_eq!(*response.status(), Some(TaskStatus::Succeeded));
    assert_eq!(response.video_url().as_deref(), Some("https://cdn.example.com/video.mp4"));
}

#[tokio::test]
async fn test_get_video_task_rejects_bad_id_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let err = client.get_video_task("../admin").await.expect_err("invalid id");
    assert_eq!(err.violations()[0].field, "task_id");
}

#[tokio::test]
async fn test_video_task_error_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contents/generations/tasks"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "InvalidParameter", "message": "bad frames"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let request = VideoGenerationRequest::builder()
        .model("doubao-seedance-1-0-pro")
        .push_content(ContentItem::text("A quiet lake"))
        .build()
        .expect("valid request");

    let response = client.create_video_task(&request).await.expect("structured response");
    let error = response.error().as_ref().expect("error body");
    assert_eq!(error.error_type, ApiErrorType::ValidationError);
    assert_eq!(error.status_code, Some(400));
    assert!(error.details.as_deref().is_some_and(|d| d.contains("bad frames")));
}

#[tokio::test]
async fn test_metrics_track_each_operation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list"})))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    client.list_models().await.expect("first");
    client.list_models().await.expect("second");

    let metrics = client.metrics();
    assert_eq!(metrics.total_calls(), 2);
    let stats = metrics.operation("list_models").expect("recorded");
    assert_eq!(*stats.calls(), 2);
    assert_eq!(*stats.failures(), 0);
    assert!(metrics.operation("generate").is_none());

    client.close();
}
