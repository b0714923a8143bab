//! HTTP API.
//!
//! Exposes single-number analysis, range batches and longest-in-range
//! queries as JSON. Range sizes are capped here; the engine itself never
//! limits them.

use crate::collatz::{CollatzError, RangeScanner, SequenceEngine, TracingObserver};
use crate::config::{Config, ServerConfig};
use crate::models::{BatchResponse, LongestResponse, SequenceAnalysis};
use crate::store::{save_run, RecordStore};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "collatz-stats";

/// Shared state for all handlers.
pub struct AppState {
    engine: SequenceEngine,
    server: ServerConfig,
    store: Option<Mutex<Box<dyn RecordStore>>>,
}

impl AppState {
    /// Build handler state from configuration and an optional record store.
    pub fn new(config: &Config, store: Option<Box<dyn RecordStore>>) -> Self {
        Self {
            engine: SequenceEngine::with_max_iterations(config.engine.max_iterations),
            server: config.server.clone(),
            store: store.map(Mutex::new),
        }
    }
}

type SharedState = Arc<AppState>;

/// A JSON error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<CollatzError> for ApiError {
    fn from(e: CollatzError) -> Self {
        match e {
            CollatzError::InvalidInput(_) => Self::bad_request(e.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::internal(format!("Analysis task failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the API router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/analyze/:number", get(analyze_endpoint))
        .route("/batch/:start/:end", get(batch_endpoint))
        .route("/longest/:start/:end", get(longest_endpoint))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config, store: Option<Box<dyn RecordStore>>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting {} API on {}", SERVICE_NAME, addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

// --- Info endpoints ---

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.server.environment,
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Collatz statistics API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "analyze": "/analyze/<number>",
            "batch": "/batch/<start>/<end>",
            "longest": "/longest/<start>/<end>",
        }
    }))
}

// --- Analysis endpoints ---

async fn analyze_endpoint(
    State(state): State<SharedState>,
    Path(number): Path<i64>,
) -> Result<Json<SequenceAnalysis>, ApiError> {
    if number <= 0 {
        return Err(ApiError::bad_request("Number must be positive"));
    }

    let engine = state.engine;
    let analysis = tokio::task::spawn_blocking(move || engine.analyze(number))
        .await?
        .map_err(|e| {
            error!("Error analyzing sequence for {}: {}", number, e);
            ApiError::from(e)
        })?;

    Ok(Json(analysis))
}

async fn batch_endpoint(
    State(state): State<SharedState>,
    Path((start, end)): Path<(i64, i64)>,
) -> Result<Json<BatchResponse>, ApiError> {
    check_range(start, end, state.server.batch_limit)?;

    let task_state = state.clone();
    let results = tokio::task::spawn_blocking(move || {
        let scanner = RangeScanner::new(task_state.engine, &TracingObserver);
        let results = scanner.batch_analyze(start, end)?;
        persist(&task_state, start, end, &results);
        Ok::<_, CollatzError>(results)
    })
    .await?
    .map_err(|e| {
        error!("Error in batch analysis {}-{}: {}", start, end, e);
        ApiError::from(e)
    })?;

    Ok(Json(BatchResponse::new(start, end, results)))
}

async fn longest_endpoint(
    State(state): State<SharedState>,
    Path((start, end)): Path<(i64, i64)>,
) -> Result<Json<LongestResponse>, ApiError> {
    check_range(start, end, state.server.longest_limit)?;

    let engine = state.engine;
    let longest = tokio::task::spawn_blocking(move || {
        RangeScanner::new(engine, &TracingObserver).find_longest(start, end)
    })
    .await?
    .map_err(|e| {
        error!("Error finding longest sequence {}-{}: {}", start, end, e);
        ApiError::from(e)
    })?;

    Ok(Json(LongestResponse::new(start, end, longest)))
}

/// Reject non-positive bounds and ranges wider than `limit`.
fn check_range(start: i64, end: i64, limit: i64) -> Result<(), ApiError> {
    if start <= 0 || end <= 0 {
        return Err(ApiError::bad_request("Numbers must be positive"));
    }
    if end - start > limit {
        return Err(ApiError::bad_request(format!(
            "Range too large (max {})",
            limit
        )));
    }
    Ok(())
}

/// Save a batch to the configured store. Failures are logged, not returned.
fn persist(state: &AppState, start: i64, end: i64, results: &[SequenceAnalysis]) {
    let Some(store) = &state.store else {
        return;
    };

    let mut store = match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let metadata = json!({ "source": "api" });
    if let Err(e) = save_run(&mut **store, "batch", start, end, results, metadata) {
        warn!("Failed to persist batch {}-{}: {:#}", start, end, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router_with(config: Config, store: Option<Box<dyn RecordStore>>) -> Router {
        build_router(Arc::new(AppState::new(&config, store)))
    }

    fn router() -> Router {
        router_with(Config::default(), None)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "collatz-stats");
        assert_eq!(body["environment"], "development");
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let (status, body) = get_json(router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["longest"], "/longest/<start>/<end>");
    }

    #[tokio::test]
    async fn test_analyze() {
        let (status, body) = get_json(router(), "/analyze/27").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["starting_number"], 27);
        assert_eq!(body["length"], 112);
        assert_eq!(body["max_value"], 9232);
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_positive() {
        let (status, body) = get_json(router(), "/analyze/0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Number must be positive");

        let (status, _) = get_json(router(), "/analyze/-4").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(router(), "/analyze/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_iteration_cap_is_server_error() {
        let mut config = Config::default();
        config.engine.max_iterations = Some(10);

        let (status, body) = get_json(router_with(config, None), "/analyze/27").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("did not reach 1"));
    }

    #[tokio::test]
    async fn test_batch() {
        let (status, body) = get_json(router(), "/batch/1/5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["start"], 1);
        assert_eq!(body["end"], 5);
        assert_eq!(body["count"], 5);
        assert_eq!(body["results"][2]["starting_number"], 3);
    }

    #[tokio::test]
    async fn test_batch_range_limits() {
        let (status, body) = get_json(router(), "/batch/1/1002").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Range too large (max 1000)");

        let (status, _) = get_json(router(), "/batch/1/1001").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(router(), "/batch/0/5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Numbers must be positive");
    }

    #[tokio::test]
    async fn test_longest() {
        let (status, body) = get_json(router(), "/longest/1/10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "1-10");
        assert_eq!(body["longest_sequence"]["starting_number"], 9);
        assert_eq!(body["longest_sequence"]["length"], 20);
    }

    #[tokio::test]
    async fn test_longest_reversed_range_is_empty() {
        let (status, body) = get_json(router(), "/longest/10/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["longest_sequence"], json!({}));
    }

    #[tokio::test]
    async fn test_longest_range_limit() {
        let (status, body) = get_json(router(), "/longest/1/10002").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Range too large (max 10000)");
    }

    #[tokio::test]
    async fn test_batch_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let router = router_with(Config::default(), Some(Box::new(store.clone())));

        let (status, _) = get_json(router, "/batch/1/10").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(store.list_sequences(None).unwrap().len(), 10);
        let runs = store.list_analysis_results().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].analysis_type, "batch");
        assert_eq!(runs[0].metadata["source"], "api");
    }
}
