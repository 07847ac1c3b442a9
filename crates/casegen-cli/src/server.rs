//! HTTP surface: frontend page, health probe, test case generation.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use casegen_core::{Generator, RequestError, ResultEnvelope, process};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared per-server state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    openapi_spec: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Unreadable body or invalid spec
    BadRequest(String),
    /// Synthesis failure or handler panic
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::InvalidSpec(_) => ApiError::BadRequest(err.to_string()),
            RequestError::Synthesis(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/generate-tests", post(generate_tests))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "casegen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The body is parsed by hand so malformed input gets the same error shape
/// as an invalid spec.
async fn generate_tests(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResultEnvelope>, ApiError> {
    let request: GenerateRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    let envelope = process(&request.openapi_spec, state.generator.as_ref()).await?;
    Ok(Json(envelope))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = message, "request handler panicked");
    ApiError::Internal("Failed to generate test cases: internal error".to_string()).into_response()
}
