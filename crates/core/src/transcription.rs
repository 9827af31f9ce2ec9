//! Pipeline output and the persisted job record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Model name recorded when the caller does not choose one
pub const DEFAULT_MODEL_NAME: &str = "bhashini";

/// Output of one successful ASR -> translation -> TTS run.
///
/// All three outputs are present or the run failed; there is no partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// ASR transcript in the source language
    pub transcript: String,
    /// Translation into the target language
    pub translation: String,
    /// Base64 encoded synthesized audio
    pub translated_audio: String,
    pub source_language: String,
    pub target_language: String,
    /// Wall-clock time at which the compute call completed.
    /// Elapsed duration is measured by the caller.
    pub processing_time: DateTime<Utc>,
}

/// A completed transcription job as stored in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRecord {
    pub id: Uuid,
    pub filename: String,
    pub file_size: u64,
    pub transcript: String,
    pub translation: String,
    pub translated_audio: String,
    pub source_language: String,
    pub target_language: String,
    pub model_name: String,
    /// Elapsed processing time in seconds
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<String>,
}

impl TranscriptionRecord {
    /// Build a record from a pipeline result with a fresh id and timestamp
    pub fn from_result(
        result: &PipelineResult,
        filename: impl Into<String>,
        file_size: u64,
        model_name: impl Into<String>,
        processing_time: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            file_size,
            transcript: result.transcript.clone(),
            translation: result.translation.clone(),
            translated_audio: result.translated_audio.clone(),
            source_language: result.source_language.clone(),
            target_language: result.target_language.clone(),
            model_name: model_name.into(),
            processing_time,
            created_at: Utc::now(),
            user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> PipelineResult {
        PipelineResult {
            transcript: "नमस्ते".to_string(),
            translation: "Hello".to_string(),
            translated_audio: "QUJD".to_string(),
            source_language: "hi".to_string(),
            target_language: "en".to_string(),
            processing_time: Utc::now(),
        }
    }

    #[test]
    fn test_record_from_result() {
        let record = TranscriptionRecord::from_result(&result(), "clip.wav", 32044, "bhashini", 1.25);
        assert_eq!(record.transcript, "नमस्ते");
        assert_eq!(record.translated_audio, "QUJD");
        assert_eq!(record.file_size, 32044);
        assert_eq!(record.model_name, DEFAULT_MODEL_NAME);
        assert!(record.user_id.is_none());
    }

    #[test]
    fn test_records_get_distinct_ids() {
        let a = TranscriptionRecord::from_result(&result(), "a.wav", 1, "bhashini", 0.1);
        let b = TranscriptionRecord::from_result(&result(), "a.wav", 1, "bhashini", 0.1);
        assert_ne!(a.id, b.id);
    }
}
