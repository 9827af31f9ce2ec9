//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{bhashini, retry, upload};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote speech pipeline configuration
    #[serde(default)]
    pub bhashini: BhashiniConfig,

    /// Transcription store configuration
    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// When false every origin is allowed
    #[serde(default)]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_max_upload_bytes() -> usize {
    upload::MAX_FILE_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: false,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// How retries are scoped across the discovery and compute calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
    /// Any failure re-runs discovery and compute together
    #[default]
    WholePipeline,
    /// Discovery and compute each retry on their own budget
    PerCall,
}

/// Retry budget for remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    #[serde(default)]
    pub scope: RetryScope,
}

fn default_max_attempts() -> u32 {
    retry::MAX_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    retry::INITIAL_BACKOFF_MS
}

fn default_max_backoff_ms() -> u64 {
    retry::MAX_BACKOFF_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            scope: RetryScope::default(),
        }
    }
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Remote speech pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhashiniConfig {
    /// Discovery endpoint
    #[serde(default = "default_config_url")]
    pub config_url: String,

    #[serde(default = "default_pipeline_id")]
    pub pipeline_id: String,

    /// Model name recorded on results
    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,

    #[serde(default = "default_compute_timeout_secs")]
    pub compute_timeout_secs: u64,

    /// Lifetime of cached discovery results per language pair. 0 disables the cache.
    #[serde(default)]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_config_url() -> String {
    bhashini::CONFIG_URL.to_string()
}

fn default_pipeline_id() -> String {
    bhashini::PIPELINE_ID.to_string()
}

fn default_model_name() -> String {
    bhashini::MODEL_NAME.to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    bhashini::DISCOVERY_TIMEOUT_SECS
}

fn default_compute_timeout_secs() -> u64 {
    bhashini::COMPUTE_TIMEOUT_SECS
}

impl Default for BhashiniConfig {
    fn default() -> Self {
        Self {
            config_url: default_config_url(),
            pipeline_id: default_pipeline_id(),
            model_name: default_model_name(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            compute_timeout_secs: default_compute_timeout_secs(),
            cache_ttl_secs: 0,
            retry: RetryConfig::default(),
        }
    }
}

impl BhashiniConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn compute_timeout(&self) -> Duration {
        Duration::from_secs(self.compute_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    vec!["127.0.0.1:9042".to_string()]
}

fn default_scylla_keyspace() -> String {
    "akara".to_string()
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_bhashini()?;
        self.validate_persistence()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    fn validate_bhashini(&self) -> Result<(), ConfigError> {
        let b = &self.bhashini;

        if !(b.config_url.starts_with("http://") || b.config_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "bhashini.config_url".to_string(),
                message: format!("must be an http(s) URL, got '{}'", b.config_url),
            });
        }
        if b.pipeline_id.trim().is_empty() {
            return Err(ConfigError::MissingField("bhashini.pipeline_id".to_string()));
        }
        if b.discovery_timeout_secs == 0 || b.compute_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bhashini.*_timeout_secs".to_string(),
                message: "timeouts must be non-zero".to_string(),
            });
        }
        if b.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bhashini.retry.max_attempts".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        if b.retry.initial_backoff_ms > b.retry.max_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "bhashini.retry.initial_backoff_ms".to_string(),
                message: format!(
                    "{}ms exceeds max_backoff_ms {}ms",
                    b.retry.initial_backoff_ms, b.retry.max_backoff_ms
                ),
            });
        }
        Ok(())
    }

    fn validate_persistence(&self) -> Result<(), ConfigError> {
        if self.persistence.enabled && self.persistence.scylla_hosts.is_empty() {
            return Err(ConfigError::MissingField("persistence.scylla_hosts".to_string()));
        }
        Ok(())
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    load_layers(dir, env, env_source())
}

/// `AKARA__SECTION__KEY` variables; list-valued keys split on commas
fn env_source() -> Environment {
    Environment::with_prefix("AKARA")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .with_list_parse_key("persistence.scylla_hosts")
}

fn load_layers(dir: &Path, env: Option<&str>, environment: Environment) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(environment);

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8001);
        assert_eq!(settings.bhashini.pipeline_id, "64392f96daac500b55c543cd");
        assert_eq!(settings.bhashini.retry.max_attempts, 3);
        assert_eq!(settings.bhashini.retry.initial_backoff(), Duration::from_secs(4));
        assert_eq!(settings.bhashini.retry.max_backoff(), Duration::from_secs(10));
        assert_eq!(settings.bhashini.discovery_timeout(), Duration::from_secs(30));
        assert_eq!(settings.bhashini.compute_timeout(), Duration::from_secs(60));
        assert_eq!(settings.bhashini.retry.scope, RetryScope::WholePipeline);
        assert_eq!(settings.bhashini.cache_ttl(), Duration::ZERO);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_retry_validation() {
        let mut settings = Settings::default();
        settings.bhashini.retry.max_attempts = 0;
        assert!(settings.validate().is_err());

        settings.bhashini.retry.max_attempts = 3;
        settings.bhashini.retry.initial_backoff_ms = 20_000;
        assert!(settings.validate().is_err());

        settings.bhashini.retry.initial_backoff_ms = 4_000;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_bhashini_validation() {
        let mut settings = Settings::default();
        settings.bhashini.config_url = "ftp://example.org".to_string();
        assert!(settings.validate().is_err());

        settings.bhashini.config_url = "http://127.0.0.1:9000/config".to_string();
        settings.bhashini.compute_timeout_secs = 0;
        assert!(settings.validate().is_err());

        settings.bhashini.compute_timeout_secs = 60;
        settings.bhashini.pipeline_id = " ".to_string();
        assert!(matches!(settings.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_files_layers_env_over_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
            [server]
            port = 9000

            [bhashini]
            cache_ttl_secs = 300

            [bhashini.retry]
            scope = "per_call"
            "#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            r#"
            environment = "staging"

            [server]
            port = 9100
            "#,
        )
        .unwrap();

        let base = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(base.server.port, 9000);
        assert_eq!(base.bhashini.cache_ttl_secs, 300);
        assert_eq!(base.bhashini.retry.scope, RetryScope::PerCall);
        assert_eq!(base.bhashini.retry.max_attempts, 3);

        let staging = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(staging.environment, RuntimeEnvironment::Staging);
        assert_eq!(staging.server.port, 9100);
        assert_eq!(staging.bhashini.cache_ttl_secs, 300);
    }

    #[test]
    fn test_env_overrides_split_lists() {
        let dir = tempfile::tempdir().unwrap();
        let vars: HashMap<String, String> = HashMap::from([
            (
                "AKARA__SERVER__CORS_ORIGINS".to_string(),
                "https://app.akara.example,http://localhost:3000".to_string(),
            ),
            ("AKARA__SERVER__CORS_ENABLED".to_string(), "true".to_string()),
            ("AKARA__SERVER__PORT".to_string(), "9100".to_string()),
            (
                "AKARA__PERSISTENCE__SCYLLA_HOSTS".to_string(),
                "10.0.0.1:9042,10.0.0.2:9042".to_string(),
            ),
            ("AKARA__BHASHINI__RETRY__SCOPE".to_string(), "per_call".to_string()),
        ]);

        let settings = load_layers(dir.path(), None, env_source().source(Some(vars))).unwrap();
        assert_eq!(
            settings.server.cors_origins,
            vec!["https://app.akara.example", "http://localhost:3000"]
        );
        assert!(settings.server.cors_enabled);
        assert_eq!(settings.server.port, 9100);
        assert_eq!(
            settings.persistence.scylla_hosts,
            vec!["10.0.0.1:9042", "10.0.0.2:9042"]
        );
        assert_eq!(settings.bhashini.retry.scope, RetryScope::PerCall);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(dir.path(), Some("missing")).unwrap();
        assert_eq!(settings.server.port, 8001);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[bhashini.retry]\nmax_attempts = 0\n",
        )
        .unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_settings_roundtrip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("pipeline_id"));
    }
}
