//! ULCA pipeline wire types
//!
//! Discovery and compute payloads share the `pipelineTasks` shape; compute
//! tasks additionally carry the resolved `serviceId` and stage parameters.

use serde::{Deserialize, Deserializer, Serialize};

use akara_core::{AudioFormat, LanguagePair, SampleRate, VoiceGender};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Asr,
    Translation,
    Tts,
}

impl TaskType {
    /// Submission order of the three stages
    pub const ORDER: [TaskType; 3] = [TaskType::Asr, TaskType::Translation, TaskType::Tts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asr => "asr",
            Self::Translation => "translation",
            Self::Tts => "tts",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Asr => 0,
            Self::Translation => 1,
            Self::Tts => 2,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    pub source_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

/// Stage configuration. Discovery sends only `language`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub language: LanguageConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<VoiceGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<AudioFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    pub task_type: TaskType,
    pub config: TaskConfig,
}

impl PipelineTask {
    fn with_language(task_type: TaskType, source: &str, target: Option<&str>) -> Self {
        Self {
            task_type,
            config: TaskConfig {
                language: LanguageConfig {
                    source_language: source.to_string(),
                    target_language: target.map(str::to_string),
                },
                service_id: None,
                gender: None,
                audio_format: None,
                sampling_rate: None,
            },
        }
    }
}

/// The ordered (asr, translation, tts) triple for one language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTaskSpec {
    pub pair: LanguagePair,
}

impl PipelineTaskSpec {
    pub fn new(pair: LanguagePair) -> Self {
        Self { pair }
    }

    /// Tasks submitted to discovery: ASR in source, translation source->target, TTS in target
    pub fn discovery_tasks(&self) -> Vec<PipelineTask> {
        let LanguagePair { source, target } = &self.pair;
        vec![
            PipelineTask::with_language(TaskType::Asr, source, None),
            PipelineTask::with_language(TaskType::Translation, source, Some(target)),
            PipelineTask::with_language(TaskType::Tts, target, None),
        ]
    }

    /// Tasks submitted to compute, with resolved service ids and fixed stage parameters
    pub fn compute_tasks(&self, services: &StageServices) -> Vec<PipelineTask> {
        let mut tasks = self.discovery_tasks();
        for task in &mut tasks {
            task.config.service_id = Some(services.get(task.task_type).to_string());
            match task.task_type {
                TaskType::Asr => {
                    task.config.audio_format = Some(AudioFormat::Wav);
                    task.config.sampling_rate = Some(SampleRate::Hz16000.as_u32());
                }
                TaskType::Translation => {}
                TaskType::Tts => {
                    task.config.gender = Some(VoiceGender::Female);
                    task.config.audio_format = Some(AudioFormat::Wav);
                    task.config.sampling_rate = Some(SampleRate::Hz22050.as_u32());
                }
            }
        }
        tasks
    }
}

/// Service id resolved for each stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageServices {
    pub asr: String,
    pub translation: String,
    pub tts: String,
}

impl StageServices {
    pub fn get(&self, task: TaskType) -> &str {
        match task {
            TaskType::Asr => &self.asr,
            TaskType::Translation => &self.translation,
            TaskType::Tts => &self.tts,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub pipeline_tasks: Vec<PipelineTask>,
    pub pipeline_request_config: PipelineRequestConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequestConfig {
    pub pipeline_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    #[serde(rename = "pipelineInferenceAPIEndPoint")]
    pub pipeline_inference_api_end_point: Option<InferenceEndpoint>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pipeline_response_config: Vec<ResponseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceEndpoint {
    pub callback_url: String,
    pub inference_api_key: InferenceApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InferenceApiKey {
    pub name: String,
    pub value: String,
}

/// Candidate services for one stage
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub config: Vec<ServiceCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCandidate {
    pub service_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Compute
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub pipeline_tasks: Vec<PipelineTask>,
    pub input_data: InputData,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputData {
    pub audio: Vec<AudioContent>,
    pub input: Vec<TextInput>,
}

impl InputData {
    pub fn from_audio(base64: String) -> Self {
        Self {
            audio: vec![AudioContent { audio_content: Some(base64) }],
            input: vec![TextInput { source: String::new() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioContent {
    pub audio_content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextInput {
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pipeline_response: Vec<StageResponse>,
}

/// Output of one stage in the compute response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse {
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub output: Vec<TextOutput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audio: Vec<AudioContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextOutput {
    pub source: Option<String>,
    pub target: Option<String>,
}

/// The service sends `null` for lists that do not apply to a stage
/// (`audio` on ASR and translation, `output` on TTS).
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn services() -> StageServices {
        StageServices {
            asr: "S1".into(),
            translation: "S2".into(),
            tts: "S3".into(),
        }
    }

    #[test]
    fn test_discovery_request_shape() {
        let spec = PipelineTaskSpec::new(LanguagePair::new("hi", "en"));
        let request = DiscoveryRequest {
            pipeline_tasks: spec.discovery_tasks(),
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: "64392f96daac500b55c543cd".into(),
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "pipelineTasks": [
                    {"taskType": "asr", "config": {"language": {"sourceLanguage": "hi"}}},
                    {"taskType": "translation", "config": {"language": {"sourceLanguage": "hi", "targetLanguage": "en"}}},
                    {"taskType": "tts", "config": {"language": {"sourceLanguage": "en"}}}
                ],
                "pipelineRequestConfig": {"pipelineId": "64392f96daac500b55c543cd"}
            })
        );
    }

    #[test]
    fn test_compute_request_shape() {
        let spec = PipelineTaskSpec::new(LanguagePair::new("ta", "hi"));
        let request = ComputeRequest {
            pipeline_tasks: spec.compute_tasks(&services()),
            input_data: InputData::from_audio("UklGRg==".into()),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "pipelineTasks": [
                    {"taskType": "asr", "config": {
                        "language": {"sourceLanguage": "ta"},
                        "serviceId": "S1", "audioFormat": "wav", "samplingRate": 16000
                    }},
                    {"taskType": "translation", "config": {
                        "language": {"sourceLanguage": "ta", "targetLanguage": "hi"},
                        "serviceId": "S2"
                    }},
                    {"taskType": "tts", "config": {
                        "language": {"sourceLanguage": "hi"},
                        "serviceId": "S3", "gender": "female", "audioFormat": "wav", "samplingRate": 22050
                    }}
                ],
                "inputData": {
                    "audio": [{"audioContent": "UklGRg=="}],
                    "input": [{"source": ""}]
                }
            })
        );
    }

    #[test]
    fn test_discovery_response_ignores_unknown_fields() {
        let body = json!({
            "languages": [],
            "pipelineResponseConfig": [
                {"taskType": "asr", "config": [{"serviceId": "S1", "modelId": "m"}]}
            ],
            "pipelineInferenceAPIEndPoint": {
                "callbackUrl": "https://example.org/compute",
                "inferenceApiKey": {"name": "Authorization", "value": "tok"},
                "isMultilingualEnabled": true
            }
        });
        let parsed: DiscoveryResponse = serde_json::from_value(body).unwrap();
        let endpoint = parsed.pipeline_inference_api_end_point.unwrap();
        assert_eq!(endpoint.callback_url, "https://example.org/compute");
        assert_eq!(endpoint.inference_api_key.name, "Authorization");
        assert_eq!(parsed.pipeline_response_config[0].task_type, Some(TaskType::Asr));
    }

    #[test]
    fn test_compute_response_accepts_null_lists() {
        let body = json!({
            "pipelineResponse": [
                {
                    "taskType": "asr",
                    "config": null,
                    "output": [{"source": "नमस्ते", "target": null}],
                    "audio": null
                },
                {
                    "taskType": "translation",
                    "config": null,
                    "output": [{"source": "नमस्ते", "target": "Hello"}],
                    "audio": null
                },
                {
                    "taskType": "tts",
                    "config": {"language": {"sourceLanguage": "en"}},
                    "output": null,
                    "audio": [{"audioContent": "QUJD", "audioUri": null}]
                }
            ]
        });
        let parsed: ComputeResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.pipeline_response.len(), 3);
        assert!(parsed.pipeline_response[0].audio.is_empty());
        assert!(parsed.pipeline_response[2].output.is_empty());
        assert_eq!(
            parsed.pipeline_response[2].audio[0].audio_content.as_deref(),
            Some("QUJD")
        );
    }

    #[test]
    fn test_discovery_response_accepts_null_candidates() {
        let body = json!({
            "pipelineResponseConfig": [{"taskType": "asr", "config": null}],
            "pipelineInferenceAPIEndPoint": null
        });
        let parsed: DiscoveryResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.pipeline_response_config[0].config.is_empty());
        assert!(parsed.pipeline_inference_api_end_point.is_none());
    }
}
