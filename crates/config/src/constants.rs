//! Centralized constants
//!
//! Defaults that the settings module and the pipeline share.

/// Bhashini (ULCA) endpoints and identifiers
pub mod bhashini {
    /// Pipeline discovery endpoint
    pub const CONFIG_URL: &str =
        "https://meity-auth.ulcacontrib.org/ulca/apis/v0/model/getModelsPipeline";

    /// MeitY pipeline id
    pub const PIPELINE_ID: &str = "64392f96daac500b55c543cd";

    /// Model name recorded on transcription records
    pub const MODEL_NAME: &str = "bhashini";

    /// Display name for the model catalog
    pub const MODEL_DISPLAY_NAME: &str = "Bhashini (Government of India)";

    pub const DISCOVERY_TIMEOUT_SECS: u64 = 30;
    pub const COMPUTE_TIMEOUT_SECS: u64 = 60;
}

/// Retry defaults for the remote calls
pub mod retry {
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const INITIAL_BACKOFF_MS: u64 = 4_000;
    pub const MAX_BACKOFF_MS: u64 = 10_000;
}

/// Environment variable names read by the credential guard
pub mod env {
    pub const USER_ID: &str = "BHASHINI_USER_ID";
    pub const ULCA_API_KEY: &str = "ULCA_API_KEY";
    pub const AUTH_TOKEN: &str = "BHASHINI_AUTH_TOKEN";
    pub const AUXILIARY_API_KEY: &str = "OPENAI_API_KEY";

    /// Selects `config/{name}.*` on top of `config/default.*`
    pub const CONFIG_ENV: &str = "AKARA_ENV";
}

/// Upload limits
pub mod upload {
    /// 50 MiB
    pub const MAX_FILE_BYTES: usize = 50 * 1024 * 1024;
}
