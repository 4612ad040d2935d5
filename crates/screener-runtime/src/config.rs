//! Runtime configuration.
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. YAML file
//! 3. `SCREENER_*` environment variables
//! 4. Explicit overrides from the caller (CLI flags)
//!
//! ```yaml
//! provider: ollama
//! model: llama3
//! endpoint: http://localhost:11434
//! timeout: 2m
//! retries: 2
//! retry_backoff: 500ms
//! json_mode: true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "ollama";

/// Environment variable names.
pub const PROVIDER_ENV: &str = "SCREENER_PROVIDER";
pub const MODEL_ENV: &str = "SCREENER_MODEL";
pub const ENDPOINT_ENV: &str = "SCREENER_ENDPOINT";
pub const TIMEOUT_ENV: &str = "SCREENER_TIMEOUT";

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid duration for {key}: {value}")]
    InvalidDuration { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one screening run's model invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Provider type registered in the provider registry
    pub provider: String,

    /// Model name; the provider's default when unset
    pub model: Option<String>,

    /// Backend address; the provider's default when unset
    pub endpoint: Option<String>,

    /// Upper bound for a single model call
    #[serde(with = "duration_text")]
    pub timeout: Duration,

    /// Extra attempts for retryable failures (0 disables retry)
    pub retries: u32,

    /// Initial delay between attempts, doubled each retry
    #[serde(with = "duration_text")]
    pub retry_backoff: Duration,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Ask the backend for JSON-constrained output
    pub json_mode: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: None,
            endpoint: None,
            timeout: Duration::from_secs(120),
            retries: 0,
            retry_backoff: Duration::from_secs(1),
            temperature: 0.0,
            max_tokens: 1024,
            json_mode: false,
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Apply `SCREENER_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = lookup(PROVIDER_ENV) {
            self.provider = provider;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.model = Some(model);
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.timeout = parse_duration(TIMEOUT_ENV, &timeout)?;
        }

        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".to_string()));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".to_string()));
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "endpoint must start with http:// or https://, got '{endpoint}'"
                )));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Provider factory configuration.
    pub fn provider_config(&self) -> serde_json::Value {
        match &self.endpoint {
            Some(endpoint) => serde_json::json!({ "base_url": endpoint }),
            None => serde_json::json!({}),
        }
    }

    /// Completion settings for the given model.
    pub fn completion_config(&self, model: &str) -> CompletionConfig {
        CompletionConfig {
            model: model.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
            json_mode: self.json_mode,
        }
    }
}

/// Parse a humantime duration ("90s", "2m", "500ms").
pub fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|_| ConfigError::InvalidDuration {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Serde adapter for humantime durations.
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(text.trim()).map_err(serde::de::Error::custom)
    }
}
