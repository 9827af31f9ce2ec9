//! Bhashini agent
//!
//! Orchestrates one run: normalize audio, resolve the pipeline for the
//! language pair, execute the compute call, and shape the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::Client;

use akara_config::{BhashiniConfig, ConfigError, Credentials, RetryScope};
use akara_core::{LanguagePair, PipelineResult, SupportedLanguages};

use crate::audio::{normalize_bytes, normalize_file, NormalizedAudio};
use crate::bhashini::{
    DiscoveryCache, ExecutionFailure, PipelineConfig, PipelineExecutor, PipelineResolver,
    PipelineTaskSpec, RetryPolicy, StageOutputs,
};
use crate::detect::LanguageDetector;
use crate::{PipelineError, RemoteError};

/// Failure of one pass through discovery and compute
#[derive(Debug)]
enum AttemptError {
    Discovery(RemoteError),
    Execution(ExecutionFailure),
}

impl AttemptError {
    fn into_pipeline_error(self, attempts: u32) -> PipelineError {
        match self {
            Self::Discovery(source) => PipelineError::PipelineConfig { attempts, source },
            Self::Execution(failure) => PipelineError::PipelineExecution {
                stage: failure.stage,
                attempts,
                source: failure.source,
            },
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "discovery: {}", e),
            Self::Execution(e) => write!(f, "execution at {}", e),
        }
    }
}

/// Speech translation agent backed by the Bhashini pipeline
pub struct BhashiniAgent {
    credentials: Arc<Credentials>,
    resolver: PipelineResolver,
    executor: PipelineExecutor,
    cache: DiscoveryCache,
    retry: RetryPolicy,
    scope: RetryScope,
    detector: LanguageDetector,
    model_name: String,
}

impl BhashiniAgent {
    /// Build from credentials in the process environment
    pub fn from_env(config: &BhashiniConfig) -> Result<Self, ConfigError> {
        let credentials = Credentials::from_env()?;
        Self::new(credentials, config)
    }

    pub fn new(credentials: Credentials, config: &BhashiniConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().build().map_err(|e| ConfigError::InvalidValue {
            field: "bhashini.http_client".to_string(),
            message: e.to_string(),
        })?;

        let credentials = Arc::new(credentials);
        let detector = LanguageDetector::new(credentials.has_auxiliary_key());

        tracing::info!(
            pipeline_id = %config.pipeline_id,
            retry_scope = ?config.retry.scope,
            max_attempts = config.retry.max_attempts,
            cache_ttl_secs = config.cache_ttl_secs,
            language_detection = detector.is_enabled(),
            "BhashiniAgent initialized"
        );

        Ok(Self {
            resolver: PipelineResolver::new(client.clone(), credentials.clone(), config),
            executor: PipelineExecutor::new(client, config.compute_timeout()),
            cache: DiscoveryCache::new(config.cache_ttl()),
            retry: RetryPolicy::from(&config.retry),
            scope: config.retry.scope,
            credentials,
            detector,
            model_name: config.model_name.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Static language catalog
    pub fn supported_languages(&self) -> SupportedLanguages {
        akara_core::supported_languages()
    }

    /// Advisory language code for `text`; `"en"` whenever detection is unavailable
    pub fn detect_language(&self, text: &str) -> String {
        self.detector.detect(text)
    }

    /// Run ASR -> translation -> TTS on an audio file
    pub async fn run_pipeline(
        &self,
        audio_path: impl AsRef<Path>,
        pair: &LanguagePair,
    ) -> Result<PipelineResult, PipelineError> {
        let path: PathBuf = audio_path.as_ref().to_path_buf();
        let audio = tokio::task::spawn_blocking(move || normalize_file(&path))
            .await
            .map_err(|e| PipelineError::AudioProcessing(format!("normalizer task: {}", e)))??;

        self.run_normalized(audio, pair).await
    }

    /// Run ASR -> translation -> TTS on an in-memory upload
    pub async fn run_pipeline_bytes(
        &self,
        data: Vec<u8>,
        extension: Option<String>,
        pair: &LanguagePair,
    ) -> Result<PipelineResult, PipelineError> {
        let audio = tokio::task::spawn_blocking(move || normalize_bytes(&data, extension.as_deref()))
            .await
            .map_err(|e| PipelineError::AudioProcessing(format!("normalizer task: {}", e)))??;

        self.run_normalized(audio, pair).await
    }

    async fn run_normalized(
        &self,
        audio: NormalizedAudio,
        pair: &LanguagePair,
    ) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        let spec = PipelineTaskSpec::new(pair.clone());

        tracing::info!(
            pair = %pair,
            audio_secs = audio.duration_secs(),
            "Running Bhashini pipeline"
        );

        let outputs = match self.scope {
            RetryScope::WholePipeline => self.run_whole(&spec, &audio.base64).await,
            RetryScope::PerCall => self.run_per_call(&spec, &audio.base64).await,
        };

        let outputs = match outputs {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::error!(pair = %pair, error = %e, "Bhashini pipeline failed");
                return Err(e);
            }
        };

        tracing::info!(
            pair = %pair,
            elapsed_ms = start.elapsed().as_millis() as u64,
            transcript_chars = outputs.transcript.chars().count(),
            "Bhashini pipeline completed"
        );

        Ok(PipelineResult {
            transcript: outputs.transcript,
            translation: outputs.translation,
            translated_audio: outputs.audio,
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
            processing_time: Utc::now(),
        })
    }

    /// Discovery and compute retried together as one unit
    async fn run_whole(
        &self,
        spec: &PipelineTaskSpec,
        audio: &str,
    ) -> Result<StageOutputs, PipelineError> {
        self.retry
            .run("Bhashini pipeline", move |_| self.attempt(spec, audio))
            .await
            .map_err(|(e, attempts)| e.into_pipeline_error(attempts))
    }

    async fn attempt(&self, spec: &PipelineTaskSpec, audio: &str) -> Result<StageOutputs, AttemptError> {
        let config = match self.cache.get(&spec.pair) {
            Some(config) => config,
            None => {
                let config = self
                    .resolver
                    .resolve(spec)
                    .await
                    .map_err(AttemptError::Discovery)?;
                self.cache.insert(spec.pair.clone(), config.clone());
                config
            }
        };

        self.execute(&config, spec, audio)
            .await
            .map_err(AttemptError::Execution)
    }

    /// Discovery and compute each on their own budget
    async fn run_per_call(
        &self,
        spec: &PipelineTaskSpec,
        audio: &str,
    ) -> Result<StageOutputs, PipelineError> {
        let config = match self.cache.get(&spec.pair) {
            Some(config) => config,
            None => {
                let resolver = &self.resolver;
                let config = self
                    .retry
                    .run("Bhashini discovery", move |_| resolver.resolve(spec))
                    .await
                    .map_err(|(source, attempts)| PipelineError::PipelineConfig { attempts, source })?;
                self.cache.insert(spec.pair.clone(), config.clone());
                config
            }
        };

        let config = &config;
        self.retry
            .run("Bhashini compute", move |_| self.execute(config, spec, audio))
            .await
            .map_err(|(failure, attempts)| PipelineError::PipelineExecution {
                stage: failure.stage,
                attempts,
                source: failure.source,
            })
    }

    async fn execute(
        &self,
        config: &PipelineConfig,
        spec: &PipelineTaskSpec,
        audio: &str,
    ) -> Result<StageOutputs, ExecutionFailure> {
        let result = self.executor.execute(config, spec, audio).await;
        if result.is_err() {
            self.cache.invalidate(&spec.pair);
        }
        result
    }
}

impl std::fmt::Debug for BhashiniAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BhashiniAgent")
            .field("credentials", &self.credentials)
            .field("retry", &self.retry)
            .field("scope", &self.scope)
            .field("cache", &self.cache)
            .field("model_name", &self.model_name)
            .finish()
    }
}
