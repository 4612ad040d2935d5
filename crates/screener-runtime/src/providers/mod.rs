//! Model backends.
//!
//! A backend turns one user message into one completion. [`LlmProvider`]
//! is the seam; [`ProviderRegistry`] picks an implementation by name:
//! `ollama` (feature `local`) or `openai` (feature `openai`).
//!
//! API keys are held as [`ApiCredential`]s and never reach `Debug` output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "local")]
mod ollama;

#[cfg(feature = "openai")]
mod openai;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "local")]
pub use ollama::{OllamaProvider, OllamaProviderFactory, DEFAULT_OLLAMA_URL};

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, OpenAiProviderFactory, DEFAULT_OPENAI_URL};

/// Failures between sending a prompt and holding the model's text.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("could not reach the model backend: {0}")]
    HttpError(String),

    #[error("rate limited by the model backend (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("model backend returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("could not decode the backend response: {0}")]
    ParseError(String),

    #[error("the model backend rejected the API key")]
    AuthError,

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Transport trouble, throttling and 5xx may clear up on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::RateLimited { .. } | Self::Timeout(_) => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::ParseError(_) | Self::AuthError | Self::NotConfigured(_) => false,
        }
    }
}

/// Per-call settings sent to the backend.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    /// 0.0 keeps the screening repeatable
    pub temperature: f32,
    /// Applied to the HTTP request itself
    pub timeout: Duration,
    /// Ask for JSON-constrained output where the backend supports it
    pub json_mode: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout: Duration::from_secs(120),
            json_mode: false,
        }
    }
}

/// One chat turn in the wire shape both backends accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The backend's answer.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Raw model text, handed to the parser untouched
    pub content: String,
    pub usage: TokenUsage,
    /// Model name as reported by the backend
    pub model: String,
    pub stop_reason: Option<String>,
}

/// Token counts reported by the backend (zero when it reports none).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// A model backend. All model calls go through here.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Name recorded in logs and run metadata.
    fn name(&self) -> &str;

    /// Rough prompt size, about four bytes per token.
    fn estimate_tokens(&self, text: &str) -> u32 {
        u32::try_from(text.len() / 4).unwrap_or(u32::MAX)
    }
}

/// Map a reqwest send failure onto the provider error taxonomy.
#[cfg(feature = "reqwest")]
pub(crate) fn map_send_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::HttpError(error.to_string())
    }
}

/// Parse a `Retry-After` header given in seconds.
#[cfg(feature = "reqwest")]
pub(crate) fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Longest error detail kept from a backend body.
#[cfg(feature = "reqwest")]
const MAX_ERROR_CHARS: usize = 200;

/// Reduce an error body to one bounded line.
///
/// Proxies in front of a backend answer with multi-line HTML; only the
/// first non-blank line is kept.
#[cfg(feature = "reqwest")]
pub(crate) fn one_line(body: &str) -> String {
    let line = body
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    match line.char_indices().nth(MAX_ERROR_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

/// Validate an optional `base_url` entry in provider config.
pub(crate) fn validate_base_url(config: &serde_json::Value) -> Result<(), ProviderError> {
    if let Some(url) = config["base_url"].as_str() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
