//! Speech pipeline orchestration
//!
//! Features:
//! - Audio normalization to 16 kHz mono 16-bit WAV
//! - Bhashini pipeline discovery (service resolution per language pair)
//! - Single multi-stage compute call (ASR -> translation -> TTS)
//! - Retry with capped exponential backoff
//! - Best-effort script-based language detection

pub mod agent;
pub mod audio;
pub mod bhashini;
pub mod detect;

pub use agent::BhashiniAgent;
pub use audio::{normalize_bytes, normalize_file, NormalizedAudio};
pub use bhashini::{
    DiscoveryCache, PipelineConfig, PipelineExecutor, PipelineResolver, RetryPolicy, TaskType,
};
pub use detect::LanguageDetector;

use akara_config::ConfigError;
use thiserror::Error;

/// Stage reported on an execution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    /// The compute call itself failed (transport, status, or unparseable body)
    Compute,
    Asr,
    Translation,
    Tts,
}

impl FailedStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Asr => "asr",
            Self::Translation => "translation",
            Self::Tts => "tts",
        }
    }
}

impl From<TaskType> for FailedStage {
    fn from(task: TaskType) -> Self {
        match task {
            TaskType::Asr => Self::Asr,
            TaskType::Translation => Self::Translation,
            TaskType::Tts => Self::Tts,
        }
    }
}

impl std::fmt::Display for FailedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response is missing {0}")]
    MissingField(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    #[error("Pipeline discovery failed after {attempts} attempt(s): {source}")]
    PipelineConfig { attempts: u32, source: RemoteError },

    #[error("Pipeline execution failed at {stage} after {attempts} attempt(s): {source}")]
    PipelineExecution {
        stage: FailedStage,
        attempts: u32,
        source: RemoteError,
    },
}

impl PipelineError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::AudioProcessing(_) => "audio_processing",
            Self::PipelineConfig { .. } => "pipeline_config",
            Self::PipelineExecution { .. } => "pipeline_execution",
        }
    }
}

impl From<hound::Error> for PipelineError {
    fn from(err: hound::Error) -> Self {
        PipelineError::AudioProcessing(format!("WAV encode: {}", err))
    }
}
