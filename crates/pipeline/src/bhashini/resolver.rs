//! Pipeline resolver (discovery call)

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use akara_config::{BhashiniConfig, Credentials};

use super::binding::bind_services;
use super::tasks::{
    DiscoveryRequest, DiscoveryResponse, InferenceApiKey, PipelineRequestConfig, PipelineTaskSpec,
    StageServices,
};
use crate::RemoteError;

/// Longest response body kept on a status error
const MAX_ERROR_BODY: usize = 512;

/// Everything the compute call needs, as returned by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub callback_url: String,
    /// Header name/value authenticating the compute call
    pub inference_key: InferenceApiKey,
    pub services: StageServices,
}

/// Resolves service ids and the inference endpoint for a language pair
pub struct PipelineResolver {
    client: Client,
    credentials: Arc<Credentials>,
    config_url: String,
    pipeline_id: String,
    timeout: Duration,
}

impl PipelineResolver {
    pub fn new(client: Client, credentials: Arc<Credentials>, config: &BhashiniConfig) -> Self {
        Self {
            client,
            credentials,
            config_url: config.config_url.clone(),
            pipeline_id: config.pipeline_id.clone(),
            timeout: config.discovery_timeout(),
        }
    }

    /// One discovery request, no retry
    pub async fn resolve(&self, spec: &PipelineTaskSpec) -> Result<PipelineConfig, RemoteError> {
        let request = DiscoveryRequest {
            pipeline_tasks: spec.discovery_tasks(),
            pipeline_request_config: PipelineRequestConfig {
                pipeline_id: self.pipeline_id.clone(),
            },
        };

        tracing::debug!(pair = %spec.pair, url = %self.config_url, "Requesting pipeline config");

        let response = self
            .client
            .post(&self.config_url)
            .header("userID", self.credentials.user_id())
            .header("ulcaApiKey", self.credentials.ulca_api_key())
            .header("Authorization", self.credentials.auth_token())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let parsed: DiscoveryResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("discovery body: {}", e)))?;

        let endpoint = parsed
            .pipeline_inference_api_end_point
            .ok_or_else(|| RemoteError::MissingField("pipelineInferenceAPIEndPoint".to_string()))?;

        let services = bind_services(&parsed.pipeline_response_config)
            .map_err(|e| RemoteError::MissingField(format!("pipelineResponseConfig ({})", e)))?;

        tracing::info!(
            pair = %spec.pair,
            asr = %services.asr,
            translation = %services.translation,
            tts = %services.tts,
            "Pipeline config resolved"
        );

        Ok(PipelineConfig {
            callback_url: endpoint.callback_url,
            inference_key: endpoint.inference_api_key,
            services,
        })
    }
}

/// Body of a 2xx response, or a status error carrying a truncated body
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let mut body = body;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
