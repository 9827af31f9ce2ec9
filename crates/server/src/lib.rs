//! Akara Server
//!
//! HTTP endpoints for audio upload, transcription, translation and history.

pub mod http;
pub mod metrics;
pub mod state;
pub mod transcription;

pub use http::create_router;
pub use metrics::{init_metrics, record_pipeline_error, record_pipeline_latency, record_request};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use akara_persistence::PersistenceError;
use akara_pipeline::PipelineError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transcription service not available: {0}")]
    AgentUnavailable(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PersistenceError> for ServerError {
    fn from(err: PersistenceError) -> Self {
        ServerError::Persistence(err.to_string())
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::AgentUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Pipeline(e) => match e {
                PipelineError::AudioProcessing(_) => StatusCode::BAD_REQUEST,
                PipelineError::Configuration(_) | PipelineError::PipelineConfig { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                PipelineError::PipelineExecution { .. } => StatusCode::BAD_GATEWAY,
            },
            ServerError::Persistence(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for the error body
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::AgentUnavailable(_) => "service_unavailable",
            ServerError::Pipeline(e) => e.kind(),
            ServerError::Persistence(_) => "persistence",
            ServerError::Internal(_) => "internal",
        }
    }

    fn summary(&self) -> String {
        match self {
            ServerError::InvalidRequest(msg) => msg.clone(),
            ServerError::AgentUnavailable(_) => "Transcription service not available".to_string(),
            ServerError::Pipeline(PipelineError::AudioProcessing(_)) => {
                "Could not process the audio file".to_string()
            }
            ServerError::Pipeline(PipelineError::PipelineExecution { stage, .. }) => {
                format!("Transcription pipeline failed at the {} stage", stage)
            }
            ServerError::Pipeline(_) => "Transcription pipeline unavailable".to_string(),
            ServerError::Persistence(_) | ServerError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = self.code(), "Request rejected");
        }

        let details = match &self {
            ServerError::InvalidRequest(_) => None,
            other => Some(other.to_string()),
        };

        let body = ErrorResponse {
            error: self.summary(),
            details,
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}
