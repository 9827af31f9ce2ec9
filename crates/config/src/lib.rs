//! Configuration management for the Akara service
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (AKARA__ prefix, `__` separated)
//!
//! Secrets are not part of [`Settings`]. They are read from the process
//! environment by [`Credentials`].

pub mod constants;
pub mod credentials;
pub mod settings;

pub use credentials::Credentials;
pub use settings::{
    load_settings, load_settings_from, BhashiniConfig, ObservabilityConfig, PersistenceConfig,
    RetryConfig, RetryScope, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Bhashini credential {0} is not set")]
    MissingCredential(String),

    #[error("Bhashini credential {0} still holds the sample placeholder value")]
    PlaceholderCredential(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
