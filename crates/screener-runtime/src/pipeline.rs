//! The screening pipeline.
//!
//! One run is strictly sequential:
//! build prompt → invoke provider (timeout, optional retry) → parse → outcome.
//!
//! A response the parser cannot recover is not an error here: it becomes
//! [`Verdict::Unparsed`] carrying the raw text, so callers can still show it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};

use screener_core::{parse, EvaluationRequest, ParseError, ScreeningReport};

use crate::config::{ConfigError, RuntimeConfig};
use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, TokenUsage,
};

/// Errors from a screening run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What the parser made of the model's answer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// A report, possibly with validation notes
    Parsed(ScreeningReport),

    /// No usable JSON object; the raw response is kept for display
    Unparsed {
        #[serde(serialize_with = "display_string")]
        error: ParseError,
        raw: String,
    },
}

/// Facts about the model call behind a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub provider: String,
    pub model: String,
    pub usage: TokenUsage,
    /// Wall time of the model call, retries included
    pub latency_ms: u64,
    pub evaluated_at: DateTime<Utc>,
}

/// Result of one screening run.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutcome {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub metadata: RunMetadata,
}

impl ScreeningOutcome {
    /// The parsed report, if the response was recoverable.
    pub fn report(&self) -> Option<&ScreeningReport> {
        match &self.verdict {
            Verdict::Parsed(report) => Some(report),
            Verdict::Unparsed { .. } => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.report().is_some()
    }
}

fn display_string<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Runs screening requests against one provider.
pub struct Screener {
    provider: Arc<dyn LlmProvider>,
    config: RuntimeConfig,
    model: String,
}

impl Screener {
    /// Create a screener around an existing provider.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig, model: impl Into<String>) -> Self {
        Self {
            provider,
            config,
            model: model.into(),
        }
    }

    /// Validate the configuration and build the configured provider.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::from_registry(&ProviderRegistry::with_defaults(), config)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied registry.
    pub fn from_registry(registry: &ProviderRegistry, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let provider = registry.create(&config.provider, &config.provider_config())?;

        let model = config
            .model
            .clone()
            .or_else(|| registry.default_model(&config.provider).map(str::to_string))
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!("no model configured for '{}'", config.provider))
            })?;

        debug!(provider = provider.name(), model = %model, "Screener ready");

        Ok(Self::new(provider, config, model))
    }

    /// Provider name.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Model the screener asks for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Evaluate one resume against one job description.
    pub async fn screen(&self, request: &EvaluationRequest) -> Result<ScreeningOutcome, RuntimeError> {
        let prompt = request.prompt();
        debug!(
            prompt_chars = prompt.chars().count(),
            estimated_tokens = self.provider.estimate_tokens(&prompt),
            "Prompt built"
        );

        let started = Instant::now();
        let response = self.invoke(&prompt).await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            model = %response.model,
            latency_ms,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            total_tokens = response.usage.total(),
            stop_reason = ?response.stop_reason,
            "Model responded"
        );

        let verdict = match parse(&response.content) {
            Ok(report) => {
                info!(
                    recommendation = %report.result.recommendation,
                    notes = report.notes.len(),
                    "Response parsed"
                );
                Verdict::Parsed(report)
            }
            Err(error) => {
                warn!(error = %error, "Model response could not be parsed");
                Verdict::Unparsed {
                    error,
                    raw: response.content.clone(),
                }
            }
        };

        let model = if response.model.is_empty() {
            self.model.clone()
        } else {
            response.model
        };

        Ok(ScreeningOutcome {
            verdict,
            metadata: RunMetadata {
                provider: self.provider.name().to_string(),
                model,
                usage: response.usage,
                latency_ms,
                evaluated_at: Utc::now(),
            },
        })
    }

    /// Send the prompt, retrying retryable failures up to `retries` times.
    async fn invoke(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let completion = self.config.completion_config(&self.model);

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.config.retry_backoff)
            .with_max_times(self.config.retries as usize);

        (|| self.attempt(prompt, &completion))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(ProviderError::is_retryable)
            .notify(|err: &ProviderError, delay: Duration| {
                warn!(error = %err, delay = ?delay, "Model call failed, retrying");
            })
            .await
    }

    /// One model call bounded by the configured timeout.
    async fn attempt(
        &self,
        prompt: &str,
        completion: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let messages = vec![ChatMessage::user(prompt)];
        let timeout = self.config.timeout;

        match tokio::time::timeout(timeout, self.provider.complete(messages, completion)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout)),
        }
    }
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}
