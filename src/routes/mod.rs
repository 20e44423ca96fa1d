use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::ApiError;
use crate::http_client::ServingClient;
use crate::load_test::{LoadTarget, LoadTestConfig, LoadTestParams, LoadTestResult, LoadTestRunner};
use crate::middleware;
use crate::models::{ChatRequest, ChatResponse};

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub serving_client: ServingClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let serving_client = ServingClient::new(
            config.serving_endpoint.clone(),
            config.api_key.clone(),
            config.upstream_timeout,
        )?;

        Ok(Self {
            config: Arc::new(config),
            serving_client,
        })
    }
}

/// API routes mounted under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api", get(root_handler))
        .route("/api/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/load-test", get(load_test_handler))
        .with_state(state)
}

/// Build the application with all routes and middleware
///
/// Requests that match no API route are served from the prebuilt web client.
pub fn build_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let cors_origins = state.config.cors_origins.clone();

    Router::new()
        .merge(api_routes(state))
        .fallback_service(ServeDir::new(static_dir))
        // Middleware stack: logging → CORS → routes
        .layer(middleware::cors_layer(&cors_origins))
        .layer(axum::middleware::from_fn(
            middleware::request_logging_middleware,
        ))
}

/// GET /api/
async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// GET /api/health - Detailed health check
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": VERSION
    }))
}

/// POST /api/chat - Forward one message to the serving endpoint
///
/// Any upstream failure becomes a 500 carrying the failure text.
async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    tracing::info!(
        message_len = request.message.len(),
        "Request to /api/chat"
    );

    match state.serving_client.complete(&request.message).await {
        Ok(content) => Ok(Json(ChatResponse { content })),
        Err(e) => {
            tracing::error!(
                error = %e,
                error_debug = ?e,
                endpoint = %state.serving_client.endpoint(),
                "An unexpected error occurred while calling the serving endpoint"
            );
            Err(e)
        }
    }
}

/// GET /api/load-test - Run a load test against the gateway and report
///
/// The run happens inside this request; it is bounded by the configured
/// maximum duration and aborted if the caller disconnects.
async fn load_test_handler(
    State(state): State<AppState>,
    params: Result<Query<LoadTestParams>, QueryRejection>,
) -> Result<Json<LoadTestResult>, ApiError> {
    let Query(params) = params?;

    let config = LoadTestConfig::try_from(params).map_err(|e| {
        tracing::warn!("Rejected load test: {}", e);
        ApiError::from(e)
    })?;
    config.ensure_max_duration(state.config.load_test.max_duration)?;

    let target = LoadTarget::from_settings(&state.config.load_test);
    let runner = LoadTestRunner::new(config, target)?;
    let result = runner.run().await?;

    Ok(Json(result))
}
