//! API keys for hosted backends.
//!
//! A key is wrapped in [`ApiCredential`] the moment it is read and only
//! unwrapped when the request header is built.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

/// Where a key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
}

/// An API key that prints as `[REDACTED]`.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
        }
    }

    /// Read `config_key` from provider settings, else `env_var`.
    ///
    /// Empty values count as unset.
    pub fn load(config: &JsonValue, config_key: &str, env_var: &str) -> Option<Self> {
        Self::load_with(config, config_key, env_var, |key| std::env::var(key).ok())
    }

    fn load_with(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        match config[config_key].as_str().filter(|v| !v.is_empty()) {
            Some(value) => Some(Self::new(value, CredentialSource::Config)),
            None => env(env_var)
                .filter(|v| !v.is_empty())
                .map(|v| Self::new(v, CredentialSource::Environment)),
        }
    }

    /// The raw key, for the request header only.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with_key(key: &str) -> Option<String> {
        (key == "SCREENER_TEST_KEY").then(|| "sk-from-env".to_string())
    }

    #[test]
    fn test_debug_hides_value() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Config);

        let debug = format!("{cred:?}");
        assert!(!debug.contains(secret));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(cred.expose(), secret);
    }

    #[test]
    fn test_config_before_env() {
        let cred = ApiCredential::load_with(
            &json!({"api_key": "sk-from-config"}),
            "api_key",
            "SCREENER_TEST_KEY",
            env_with_key,
        )
        .unwrap();

        assert_eq!(cred.expose(), "sk-from-config");
        assert_eq!(cred.source(), CredentialSource::Config);
    }

    #[test]
    fn test_env_fallback() {
        let cred =
            ApiCredential::load_with(&json!({"api_key": ""}), "api_key", "SCREENER_TEST_KEY", env_with_key)
                .unwrap();

        assert_eq!(cred.expose(), "sk-from-env");
        assert_eq!(cred.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_missing_everywhere() {
        assert!(ApiCredential::load_with(&json!({}), "api_key", "SCREENER_OTHER_KEY", env_with_key)
            .is_none());
    }
}
