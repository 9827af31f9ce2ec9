//! Transcription endpoints
//!
//! Upload validation, synchronous and background pipeline runs, the
//! language catalog, history and per-service health.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use akara_config::constants::bhashini::{MODEL_DISPLAY_NAME, MODEL_NAME};
use akara_core::{
    LanguagePair, PipelineResult, SupportedLanguages, TranscriptionRecord, DEFAULT_MODEL_NAME,
};
use akara_pipeline::{LanguageDetector, PipelineError};

use crate::metrics::{record_pipeline_error, record_pipeline_latency, record_request};
use crate::state::AppState;
use crate::ServerError;

/// Accepted upload MIME types
pub const SUPPORTED_FORMATS: [&str; 12] = [
    "audio/wav",
    "audio/wave",
    "audio/x-wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/x-mp3",
    "audio/mp4",
    "audio/x-mp4",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
    "audio/x-flac",
];

/// History previews are cut to this many characters
const PREVIEW_CHARS: usize = 100;

/// Multipart form shared by `/transcribe` and `/upload`
#[derive(Debug)]
struct UploadForm {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
    source_language: String,
    target_language: String,
    model_name: String,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut form = UploadForm {
            filename: None,
            content_type: None,
            data: Bytes::new(),
            source_language: "hi".to_string(),
            target_language: "en".to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Failed to read multipart: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    form.filename = field.file_name().map(str::to_string);
                    form.content_type = field.content_type().map(str::to_string);
                    form.data = field.bytes().await.map_err(|e| {
                        ServerError::InvalidRequest(format!("Failed to read file: {}", e))
                    })?;
                }
                "source_language" | "target_language" | "model_name" => {
                    let value = field.text().await.map_err(|e| {
                        ServerError::InvalidRequest(format!("Failed to read {}: {}", name, e))
                    })?;
                    let value = value.trim().to_string();
                    if value.is_empty() {
                        continue;
                    }
                    match name.as_str() {
                        "source_language" => form.source_language = value,
                        "target_language" => form.target_language = value,
                        _ => form.model_name = value,
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        Ok(form)
    }

    fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.source_language, &self.target_language)
    }

    fn extension(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(|f| Path::new(f).extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Reject uploads without a filename, with an unsupported MIME type, or
/// larger than `max_bytes`. Returns the filename.
pub fn validate_upload<'a>(
    filename: Option<&'a str>,
    content_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> Result<&'a str, ServerError> {
    let filename = filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("No file selected".to_string()))?;

    let supported = content_type
        .map(|ct| SUPPORTED_FORMATS.contains(&ct))
        .unwrap_or(false);
    if !supported {
        return Err(ServerError::InvalidRequest(format!(
            "Unsupported file format. Supported formats: {}",
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    if size > max_bytes {
        return Err(ServerError::InvalidRequest(format!(
            "File too large. Maximum size: {:.1}MB",
            max_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(filename)
}

/// Cut `text` to the preview length, marking the cut with `...`
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub id: Uuid,
    pub transcript: String,
    pub translation: String,
    pub translated_audio: String,
    pub source_language: String,
    pub target_language: String,
    pub model_name: String,
    /// Seconds
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&TranscriptionRecord> for TranscriptionResponse {
    fn from(record: &TranscriptionRecord) -> Self {
        Self {
            id: record.id,
            transcript: record.transcript.clone(),
            translation: record.translation.clone(),
            translated_audio: record.translated_audio.clone(),
            source_language: record.source_language.clone(),
            target_language: record.target_language.clone(),
            model_name: record.model_name.clone(),
            processing_time: record.processing_time,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_id: Uuid,
    pub filename: String,
    pub file_size: usize,
    pub supported_formats: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    #[serde(flatten)]
    pub languages: SupportedLanguages,
    pub models: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub filename: String,
    pub transcript: String,
    pub translation: String,
    pub source_language: String,
    pub target_language: String,
    pub model_name: String,
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
}

impl From<TranscriptionRecord> for HistoryItem {
    fn from(record: TranscriptionRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            transcript: preview(&record.transcript),
            translation: preview(&record.translation),
            source_language: record.source_language,
            target_language: record.target_language,
            model_name: record.model_name,
            processing_time: record.processing_time,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Deserialize)]
pub struct DetectLanguageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DetectLanguageResponse {
    pub language: String,
}

/// Run the pipeline and time it, recording metrics either way
async fn run_timed(
    state: &AppState,
    form: &UploadForm,
) -> Result<(PipelineResult, f64), PipelineError> {
    let agent = match state.agent.as_ref() {
        Ok(agent) => agent,
        Err(e) => return Err(PipelineError::Configuration(e.clone())),
    };

    let start = Instant::now();
    let result = agent
        .run_pipeline_bytes(form.data.to_vec(), form.extension(), &form.pair())
        .await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(result) => {
            record_pipeline_latency(elapsed);
            Ok((result, elapsed))
        }
        Err(e) => {
            record_pipeline_error(e.kind());
            Err(e)
        }
    }
}

/// `POST /api/transcription/transcribe`
#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ServerError> {
    record_request("transcribe");
    state.agent()?;

    let form = UploadForm::read(multipart).await?;
    let filename = validate_upload(
        form.filename.as_deref(),
        form.content_type.as_deref(),
        form.data.len(),
        state.config.server.max_upload_bytes,
    )?
    .to_string();

    tracing::info!(
        filename = %filename,
        bytes = form.data.len(),
        pair = %form.pair(),
        "Transcription requested"
    );

    let (result, elapsed) = run_timed(&state, &form).await?;
    let record = TranscriptionRecord::from_result(
        &result,
        &filename,
        form.data.len() as u64,
        &form.model_name,
        elapsed,
    );
    state.store.insert(&record).await?;

    tracing::info!(
        id = %record.id,
        filename = %filename,
        processing_secs = elapsed,
        "Transcription completed"
    );

    Ok(Json(TranscriptionResponse::from(&record)))
}

/// `POST /api/transcription/upload`
///
/// Validates and returns at once. The pipeline runs on a spawned task that
/// persists the record on success and only logs on failure.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    record_request("upload");

    let form = UploadForm::read(multipart).await?;
    let filename = validate_upload(
        form.filename.as_deref(),
        form.content_type.as_deref(),
        form.data.len(),
        state.config.server.max_upload_bytes,
    )?
    .to_string();

    let file_id = Uuid::new_v4();
    let file_size = form.data.len();
    tracing::info!(%file_id, filename = %filename, bytes = file_size, "Audio file uploaded");

    let task_state = state.clone();
    let task_filename = filename.clone();
    tokio::spawn(async move {
        process_in_background(task_state, form, task_filename, file_id).await;
    });

    Ok(Json(UploadResponse {
        message: "File uploaded successfully. Processing started.".to_string(),
        file_id,
        filename,
        file_size,
        supported_formats: SUPPORTED_FORMATS.to_vec(),
    }))
}

async fn process_in_background(state: AppState, form: UploadForm, filename: String, file_id: Uuid) {
    let (result, elapsed) = match run_timed(&state, &form).await {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(%file_id, filename = %filename, error = %e, "Background transcription failed");
            return;
        }
    };

    let record = TranscriptionRecord::from_result(
        &result,
        &filename,
        form.data.len() as u64,
        &form.model_name,
        elapsed,
    );

    match state.store.insert(&record).await {
        Ok(()) => tracing::info!(
            %file_id,
            id = %record.id,
            processing_secs = elapsed,
            "Background transcription completed"
        ),
        Err(e) => tracing::error!(%file_id, error = %e, "Failed to persist background transcription"),
    }
}

/// `GET /api/transcription/languages`
pub async fn languages(State(state): State<AppState>) -> Result<Json<LanguagesResponse>, ServerError> {
    record_request("languages");
    let agent = state.agent()?;

    let mut models = BTreeMap::new();
    models.insert(MODEL_NAME.to_string(), MODEL_DISPLAY_NAME.to_string());

    Ok(Json(LanguagesResponse {
        languages: agent.supported_languages(),
        models,
    }))
}

/// `GET /api/transcription/history`
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    record_request("history");
    let page = state.store.history(query.limit, query.offset).await?;

    Ok(Json(HistoryResponse {
        total: page.total,
        limit: query.limit,
        offset: query.offset,
        history: page.records.into_iter().map(HistoryItem::from).collect(),
    }))
}

/// `GET /api/transcription/health`
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    record_request("transcription_health");

    let agent_status = if state.is_agent_available() { "healthy" } else { "unhealthy" };
    let database_status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            "unhealthy"
        }
    };
    let overall = if agent_status == "healthy" && database_status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(serde_json::json!({
        "status": overall,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "bhashini_agent": agent_status,
            "database": database_status,
        },
        "timestamp": Utc::now().timestamp_millis() as f64 / 1000.0,
    }))
}

/// `POST /api/transcription/detect-language`
///
/// Advisory. Answers `en` when the agent is unavailable.
pub async fn detect_language(
    State(state): State<AppState>,
    Json(request): Json<DetectLanguageRequest>,
) -> Json<DetectLanguageResponse> {
    record_request("detect_language");

    let language = match state.agent.as_ref() {
        Ok(agent) => agent.detect_language(&request.text),
        Err(_) => LanguageDetector::new(false).detect(&request.text),
    };

    Json(DetectLanguageResponse { language })
}
