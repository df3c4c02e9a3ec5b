//! Pooled, retrying API client.

use crate::{CallMetrics, ClientConfig, ErrorClassifier};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use seedance_cache::{ResponseCache, fingerprint};
use seedance_core::{
    ApiErrorBody, GenerationRequest, GenerationResponse, VideoGenerationRequest,
    VideoGenerationResponse, is_identifier,
};
use seedance_error::{
    ConfigError, SeedanceError, SeedanceResult, StatusCarrier, TransportError,
    TransportErrorKind, ValidationViolation, ViolationKind,
};
use seedance_retry::retry_with_backoff;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

const GENERATE: &str = "generate";
const LIST_MODELS: &str = "list_models";
const CREATE_VIDEO_TASK: &str = "create_video_task";
const GET_VIDEO_TASK: &str = "get_video_task";

/// Response shapes the client can decode or synthesise from a failure.
trait ApiResponse: StatusCarrier + Sized {
    fn decode(value: Value) -> SeedanceResult<Self>;
    fn from_error(error: ApiErrorBody) -> Self;
    fn is_error(&self) -> bool;
}

impl ApiResponse for GenerationResponse {
    fn decode(value: Value) -> SeedanceResult<Self> {
        GenerationResponse::from_json(value)
    }

    fn from_error(error: ApiErrorBody) -> Self {
        GenerationResponse::from_error(error)
    }

    fn is_error(&self) -> bool {
        GenerationResponse::is_error(self)
    }
}

impl ApiResponse for VideoGenerationResponse {
    fn decode(value: Value) -> SeedanceResult<Self> {
        VideoGenerationResponse::from_json(value)
    }

    fn from_error(error: ApiErrorBody) -> Self {
        VideoGenerationResponse::from_error(error)
    }

    fn is_error(&self) -> bool {
        VideoGenerationResponse::is_error(self)
    }
}

/// Client for the Volces v3 API.
///
/// Holds one connection pool for its whole lifetime and is safe to share
/// between tasks behind an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use seedance_client::VolcesClient;
/// use seedance_core::GenerationRequest;
///
/// # async fn run() -> Result<(), seedance_error::SeedanceError> {
/// let client = VolcesClient::from_env()?;
/// let request = GenerationRequest::builder()
///     .prompt("Write a haiku about rivers")
///     .temperature(0.0)
///     .build()?;
///
/// let response = client.generate(&request).await?;
/// if let Some(error) = response.error() {
///     eprintln!("{}: {}", error.error_type, error.message);
/// }
/// # Ok(())
/// # }
/// ```
pub struct VolcesClient {
    http: Client,
    config: ClientConfig,
    cache: Mutex<ResponseCache>,
    metrics: Mutex<CallMetrics>,
}

impl VolcesClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails if the API key cannot be used as a header value or the HTTP
    /// client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: ClientConfig) -> SeedanceResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|_| ConfigError::new("API key contains characters not allowed in a header"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(*config.timeout())
            .pool_max_idle_per_host(*config.pool().pool_maxsize())
            .pool_idle_timeout(*config.pool().idle_timeout())
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!(
            timeout_ms = config.timeout().as_millis() as u64,
            max_retries = *config.retry().max_retries(),
            "Created Volces client"
        );

        Ok(Self {
            http,
            cache: Mutex::new(ResponseCache::new(config.cache().clone())),
            metrics: Mutex::new(CallMetrics::default()),
            config,
        })
    }

    /// Creates a client from `VOLCES_API_KEY` and `VOLCES_BASE_HOST`.
    ///
    /// # Errors
    ///
    /// Fails if the API key is missing or invalid.
    pub fn from_env() -> SeedanceResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Creates a client with default settings and the given key.
    ///
    /// # Errors
    ///
    /// Fails if the key is invalid.
    pub fn with_api_key(api_key: impl Into<String>) -> SeedanceResult<Self> {
        Self::new(ClientConfig::builder().api_key(api_key).build()?)
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Locks the response cache for inspection or maintenance.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of per-operation call statistics.
    pub fn metrics(&self) -> CallMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sends a text generation request.
    ///
    /// Deterministic requests (`temperature == 0`) are served from the cache
    /// when possible, and successful responses to them are cached.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when a connection-level failure persisted through
    /// every retry. API failures come back as a response with `error` set.
    #[instrument(
        skip(self, request),
        fields(prompt = %request.prompt_summary(), model = ?request.model())
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> SeedanceResult<GenerationResponse> {
        let start = Instant::now();
        info!("Making API call");

        let key = fingerprint(request);
        let cached = key.as_ref().and_then(|key| self.cache().get(key));
        if let Some(cached) = cached {
            let elapsed = start.elapsed();
            info!(duration_ms = elapsed.as_millis() as u64, "API call completed via cache");
            self.record(GENERATE, elapsed, false);
            return Ok(cached);
        }

        let url = self.endpoint(GENERATE);
        let result = self
            .execute::<GenerationResponse, _>(Method::POST, &url, Some(request), GENERATE)
            .await;

        if let (Some(key), Ok(response)) = (key, &result)
            && !response.is_error()
        {
            debug!("Caching deterministic response");
            self.cache().put(key, response.clone());
        }

        self.finish(GENERATE, start, &result);
        result
    }

    /// Lists the models available to the account.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when a connection-level failure persisted through
    /// every retry.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> SeedanceResult<GenerationResponse> {
        let start = Instant::now();
        let url = self.endpoint("models");
        info!(url = %url, "Fetching models");

        let result = self
            .execute::<GenerationResponse, ()>(Method::GET, &url, None, LIST_MODELS)
            .await;

        self.finish(LIST_MODELS, start, &result);
        result
    }

    /// Submits a video generation task. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when a connection-level failure persisted through
    /// every retry.
    #[instrument(
        skip(self, request),
        fields(model = %request.model(), prompt = %request.prompt_summary())
    )]
    pub async fn create_video_task(
        &self,
        request: &VideoGenerationRequest,
    ) -> SeedanceResult<VideoGenerationResponse> {
        let start = Instant::now();
        info!("Making video generation task call");

        let url = self.endpoint("contents/generations/tasks");
        let result = self
            .execute::<VideoGenerationResponse, _>(
                Method::POST,
                &url,
                Some(request),
                CREATE_VIDEO_TASK,
            )
            .await;

        self.finish(CREATE_VIDEO_TASK, start, &result);
        result
    }

    /// Fetches the state of a video generation task.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `task_id` is not an identifier, or `Err`
    /// when a connection-level failure persisted through every retry.
    #[instrument(skip(self))]
    pub async fn get_video_task(&self, task_id: &str) -> SeedanceResult<VideoGenerationResponse> {
        if !is_identifier(task_id) {
            return Err(SeedanceError::validation(vec![ValidationViolation::new(
                ViolationKind::Pattern,
                "task_id",
                "Task ID can only contain alphanumeric characters, hyphens, underscores, and dots",
            )]));
        }

        let start = Instant::now();
        let url = self.endpoint(&format!("contents/generations/tasks/{}", task_id));
        let result = self
            .execute::<VideoGenerationResponse, ()>(Method::GET, &url, None, GET_VIDEO_TASK)
            .await;

        self.finish(GET_VIDEO_TASK, start, &result);
        result
    }

    /// Shuts the client down, releasing pooled connections.
    pub fn close(self) {
        debug!(cached = self.cache().len(), "Closing Volces client");
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url().trim_end_matches('/'), path)
    }

    async fn execute<R, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        operation: &'static str,
    ) -> SeedanceResult<R>
    where
        R: ApiResponse,
        B: Serialize + ?Sized,
    {
        retry_with_backoff(self.config.retry(), move || {
            self.attempt::<R, B>(method.clone(), url, body, operation)
        })
        .await
    }

    /// One HTTP round trip.
    ///
    /// Transient connection failures are returned as `Err` for the retry
    /// loop; everything else becomes a response, classified if it failed.
    async fn attempt<R, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        operation: &'static str,
    ) -> SeedanceResult<R>
    where
        R: ApiResponse,
        B: Serialize + ?Sized,
    {
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = transport_error(&e);
                if err.kind().is_transient() {
                    return Err(err.into());
                }
                return Ok(classified(err.into(), operation));
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), "Received response");

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let err = transport_error(&e);
                if err.kind().is_transient() {
                    return Err(err.into());
                }
                let err = err.with_status_code(status.as_u16());
                return Ok(classified(err.into(), operation));
            }
        };

        if !status.is_success() {
            let err = TransportError::status(status.as_u16(), text);
            return Ok(classified(err.into(), operation));
        }

        let decoded = serde_json::from_str::<Value>(&text)
            .map_err(|e| SeedanceError::from(TransportError::new(TransportErrorKind::Decode, e.to_string())))
            .and_then(R::decode);
        match decoded {
            Ok(response) => Ok(response),
            Err(err) => Ok(classified(err, operation)),
        }
    }

    fn finish<R: ApiResponse>(&self, operation: &str, start: Instant, result: &SeedanceResult<R>) {
        let elapsed = start.elapsed();
        let failed = match result {
            Ok(response) => response.is_error(),
            Err(_) => true,
        };
        info!(
            operation,
            duration_ms = elapsed.as_millis() as u64,
            failed,
            "API call completed"
        );
        self.record(operation, elapsed, failed);
    }

    fn record(&self, operation: &str, elapsed: Duration, failed: bool) {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(operation, elapsed, failed);
    }
}

impl std::fmt::Debug for VolcesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolcesClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn classified<R: ApiResponse>(err: SeedanceError, operation: &str) -> R {
    R::from_error(ErrorClassifier::error_body(&err, operation))
}

fn transport_error(err: &reqwest::Error) -> TransportError {
    let kind = if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_builder() {
        TransportErrorKind::Build
    } else if err.is_decode() {
        TransportErrorKind::Decode
    } else if err.is_body() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    };
    let transport = TransportError::new(kind, err.to_string());
    match err.status() {
        Some(status) => transport.with_status_code(status.as_u16()),
        None => transport,
    }
}
