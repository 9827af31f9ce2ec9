//! Stage binding
//!
//! The remote service answers with per-stage arrays. This module is the only
//! place that decides which array entry belongs to which stage: by the
//! `taskType` tag when the service provides one, otherwise by position in
//! submission order (asr, translation, tts).

use thiserror::Error;

use super::tasks::{ResponseConfig, StageResponse, StageServices, TaskType};

/// A stage entry could not be bound or lacked a required field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} stage: {detail}")]
pub struct BindingError {
    pub stage: TaskType,
    pub detail: String,
}

impl BindingError {
    fn new(stage: TaskType, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

/// Text and audio extracted from the compute response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutputs {
    pub transcript: String,
    pub translation: String,
    pub audio: String,
}

/// Find the entry for `stage`, by tag if any entry is tagged, else by index
fn locate<T>(
    entries: &[T],
    stage: TaskType,
    tag: impl Fn(&T) -> Option<TaskType>,
) -> Result<&T, BindingError> {
    let tagged = entries.iter().any(|e| tag(e).is_some());

    let found = if tagged {
        entries.iter().find(|e| tag(e) == Some(stage))
    } else {
        entries.get(stage.index())
    };

    found.ok_or_else(|| {
        if tagged {
            BindingError::new(stage, "no entry tagged for this stage")
        } else {
            BindingError::new(stage, format!("no entry at index {}", stage.index()))
        }
    })
}

/// Pick the first candidate service id for each stage
pub fn bind_services(configs: &[ResponseConfig]) -> Result<StageServices, BindingError> {
    let service_for = |stage: TaskType| -> Result<String, BindingError> {
        let entry = locate(configs, stage, |c| c.task_type)?;
        entry
            .config
            .first()
            .ok_or_else(|| BindingError::new(stage, "empty candidate list"))?
            .service_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BindingError::new(stage, "candidate has no serviceId"))
    };

    Ok(StageServices {
        asr: service_for(TaskType::Asr)?,
        translation: service_for(TaskType::Translation)?,
        tts: service_for(TaskType::Tts)?,
    })
}

/// Extract transcript (asr `output[0].source`), translation
/// (translation `output[0].target`) and audio (tts `audio[0].audioContent`)
pub fn bind_outputs(responses: &[StageResponse]) -> Result<StageOutputs, BindingError> {
    let asr = locate(responses, TaskType::Asr, |r| r.task_type)?;
    let transcript = asr
        .output
        .first()
        .and_then(|o| o.source.clone())
        .ok_or_else(|| BindingError::new(TaskType::Asr, "missing output[0].source"))?;

    let translation_stage = locate(responses, TaskType::Translation, |r| r.task_type)?;
    let translation = translation_stage
        .output
        .first()
        .and_then(|o| o.target.clone())
        .ok_or_else(|| BindingError::new(TaskType::Translation, "missing output[0].target"))?;

    let tts = locate(responses, TaskType::Tts, |r| r.task_type)?;
    let audio = tts
        .audio
        .first()
        .and_then(|a| a.audio_content.clone())
        .ok_or_else(|| BindingError::new(TaskType::Tts, "missing audio[0].audioContent"))?;

    Ok(StageOutputs {
        transcript,
        translation,
        audio,
    })
}
