//! Credential guard
//!
//! Reads the Bhashini secrets once at startup. Construction fails if any
//! mandatory secret is absent, empty, or still the placeholder from the
//! sample `.env`, so no request is ever attempted with unusable credentials.

use crate::constants::env;
use crate::ConfigError;

/// Placeholder values shipped in the sample `.env`
const PLACEHOLDERS: [(&str, &str); 3] = [
    (env::USER_ID, "your_user_id_here"),
    (env::ULCA_API_KEY, "your_ulca_key_here"),
    (env::AUTH_TOKEN, "your_auth_token_here"),
];

/// Bhashini API credentials, immutable after construction
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    ulca_api_key: String,
    auth_token: String,
    auxiliary_api_key: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup (env, vault, test map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = required(&lookup, env::USER_ID)?;
        let ulca_api_key = required(&lookup, env::ULCA_API_KEY)?;
        let auth_token = required(&lookup, env::AUTH_TOKEN)?;
        let auxiliary_api_key = lookup(env::AUXILIARY_API_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        tracing::info!(
            auxiliary_key = auxiliary_api_key.is_some(),
            "Bhashini credentials loaded"
        );

        Ok(Self {
            user_id,
            ulca_api_key,
            auth_token,
            auxiliary_api_key,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn ulca_api_key(&self) -> &str {
        &self.ulca_api_key
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn auxiliary_api_key(&self) -> Option<&str> {
        self.auxiliary_api_key.as_deref()
    }

    /// Whether the optional language-detection capability is enabled
    pub fn has_auxiliary_key(&self) -> bool {
        self.auxiliary_api_key.is_some()
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))?;

    let is_placeholder = PLACEHOLDERS
        .iter()
        .any(|(key, placeholder)| *key == name && value == *placeholder);
    if is_placeholder {
        return Err(ConfigError::PlaceholderCredential(name.to_string()));
    }

    Ok(value)
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("ulca_api_key", &"<redacted>")
            .field("auth_token", &"<redacted>")
            .field("auxiliary_api_key", &self.auxiliary_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (env::USER_ID, "user-123"),
            (env::ULCA_API_KEY, "ulca-key"),
            (env::AUTH_TOKEN, "auth-token"),
        ])
    }

    fn lookup(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_all_mandatory_present() {
        let creds = Credentials::from_lookup(lookup(full())).unwrap();
        assert_eq!(creds.user_id(), "user-123");
        assert_eq!(creds.ulca_api_key(), "ulca-key");
        assert_eq!(creds.auth_token(), "auth-token");
        assert!(!creds.has_auxiliary_key());
    }

    #[test]
    fn test_any_missing_mandatory_fails() {
        for name in [env::USER_ID, env::ULCA_API_KEY, env::AUTH_TOKEN] {
            let mut map = full();
            map.remove(name);
            let err = Credentials::from_lookup(lookup(map)).unwrap_err();
            assert_eq!(err, ConfigError::MissingCredential(name.to_string()));
        }
    }

    #[test]
    fn test_any_empty_mandatory_fails() {
        for name in [env::USER_ID, env::ULCA_API_KEY, env::AUTH_TOKEN] {
            let mut map = full();
            map.insert(name, "   ");
            let err = Credentials::from_lookup(lookup(map)).unwrap_err();
            assert_eq!(err, ConfigError::MissingCredential(name.to_string()));
        }
    }

    #[test]
    fn test_placeholder_rejected() {
        for (name, placeholder) in PLACEHOLDERS {
            let mut map = full();
            map.insert(name, placeholder);
            let err = Credentials::from_lookup(lookup(map)).unwrap_err();
            assert_eq!(err, ConfigError::PlaceholderCredential(name.to_string()));
        }
    }

    #[test]
    fn test_auxiliary_key_is_optional() {
        let mut map = full();
        map.insert(env::AUXILIARY_API_KEY, "sk-aux");
        let creds = Credentials::from_lookup(lookup(map)).unwrap();
        assert!(creds.has_auxiliary_key());
        assert_eq!(creds.auxiliary_api_key(), Some("sk-aux"));

        let mut map = full();
        map.insert(env::AUXILIARY_API_KEY, "");
        let creds = Credentials::from_lookup(lookup(map)).unwrap();
        assert!(!creds.has_auxiliary_key());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::from_lookup(lookup(full())).unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("ulca-key"));
        assert!(!printed.contains("auth-token"));
    }
}
