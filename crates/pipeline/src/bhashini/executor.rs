//! Pipeline executor (compute call)

use std::time::Duration;

use reqwest::Client;

use super::binding::{bind_outputs, StageOutputs};
use super::resolver::{read_success_body, PipelineConfig};
use super::tasks::{ComputeRequest, ComputeResponse, InputData, PipelineTaskSpec};
use crate::{FailedStage, RemoteError};

/// A failed compute attempt and the stage it is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    pub stage: FailedStage,
    pub source: RemoteError,
}

impl ExecutionFailure {
    fn compute(source: RemoteError) -> Self {
        Self {
            stage: FailedStage::Compute,
            source,
        }
    }
}

impl From<reqwest::Error> for ExecutionFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::compute(err.into())
    }
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.source)
    }
}

/// Issues the single multi-stage compute request
pub struct PipelineExecutor {
    client: Client,
    timeout: Duration,
}

impl PipelineExecutor {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// One compute request, no retry
    pub async fn execute(
        &self,
        config: &PipelineConfig,
        spec: &PipelineTaskSpec,
        audio_base64: &str,
    ) -> Result<StageOutputs, ExecutionFailure> {
        let request = ComputeRequest {
            pipeline_tasks: spec.compute_tasks(&config.services),
            input_data: InputData::from_audio(audio_base64.to_string()),
        };

        tracing::debug!(pair = %spec.pair, url = %config.callback_url, "Submitting compute request");

        let response = self
            .client
            .post(&config.callback_url)
            .header(
                config.inference_key.name.as_str(),
                config.inference_key.value.as_str(),
            )
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let body = read_success_body(response)
            .await
            .map_err(ExecutionFailure::compute)?;

        let parsed: ComputeResponse = serde_json::from_str(&body).map_err(|e| {
            ExecutionFailure::compute(RemoteError::InvalidResponse(format!("compute body: {}", e)))
        })?;

        bind_outputs(&parsed.pipeline_response).map_err(|e| ExecutionFailure {
            stage: e.stage.into(),
            source: RemoteError::MissingField(e.detail),
        })
    }
}
