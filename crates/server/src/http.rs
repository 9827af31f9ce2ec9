//! HTTP Endpoints
//!
//! REST API for the Akara speech translation service.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::transcription;

/// Room for multipart framing and the text fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );
    let body_limit = state
        .config
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let transcription_routes = Router::new()
        .route("/transcribe", post(transcription::transcribe))
        .route("/upload", post(transcription::upload))
        .route("/languages", get(transcription::languages))
        .route("/history", get(transcription::history))
        .route("/health", get(transcription::health))
        .route("/detect-language", post(transcription::detect_language));

    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/health", get(health_check))
        .nest("/api/transcription", transcription_routes)
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
pub fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_CORS_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_CORS_ORIGIN))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Service banner
async fn root() -> impl IntoResponse {
    record_request("root");
    Json(serde_json::json!({
        "message": "Akara Backend API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multilingual AI-Based Voice Meeting System",
    }))
}

/// Store connectivity check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    record_request("health");

    let database = match state.store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let status = if database == "connected" { "healthy" } else { "unhealthy" };

    Json(serde_json::json!({
        "status": status,
        "database": database,
        "distributed_store": state.is_distributed_store(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "Akara API",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
