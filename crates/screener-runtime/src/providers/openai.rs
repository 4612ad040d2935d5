//! OpenAI-compatible chat completions provider.
//!
//! Works with any server exposing `/chat/completions` (OpenAI, vLLM,
//! LM Studio, llama.cpp server). The API key is optional for local servers.

use super::{
    factory::ProviderFactory, map_send_error, one_line, retry_after, secrets::ApiCredential,
    validate_base_url, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider,
    ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Environment variable name for the API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default API base.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    credential: Option<ApiCredential>,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build from `{"api_key", "base_url"}`; the key falls back to `OPENAI_API_KEY`.
    pub fn from_config(config: &JsonValue) -> Self {
        let credential = ApiCredential::load(config, "api_key", OPENAI_API_KEY_ENV);
        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(DEFAULT_OPENAI_URL)
            .trim_end_matches('/')
            .to_string();

        debug!(
            base_url = %base_url,
            key_source = ?credential.as_ref().map(ApiCredential::source),
            "OpenAI-compatible provider configured"
        );

        Self {
            credential,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

/// Chat completions request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

/// Chat completions response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request<'a>(messages: &'a [ChatMessage], config: &'a CompletionConfig) -> OpenAiRequest<'a> {
    OpenAiRequest {
        model: &config.model,
        messages,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        response_format: config.json_mode.then_some(ResponseFormat {
            type_: "json_object",
        }),
    }
}

impl TryFrom<OpenAiResponse> for CompletionResponse {
    type Error = ProviderError;

    fn try_from(body: OpenAiResponse) -> Result<Self, Self::Error> {
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))?;

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: body.model,
            stop_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = build_request(&messages, config);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(config.timeout)
            .json(&request);

        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, config.timeout))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after: retry_after(&response),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: one_line(&message),
            });
        }

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        CompletionResponse::try_from(body)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Factory for creating OpenAI-compatible providers.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",                      // Optional, falls back to OPENAI_API_KEY
///   "base_url": "https://api.openai.com/v1"   // Optional
/// }
/// ```
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::from_config(config)))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        validate_base_url(config)?;

        // The hosted API needs a key; self-hosted servers usually do not.
        let hosted = config["base_url"]
            .as_str()
            .map_or(true, |url| url.trim_end_matches('/') == DEFAULT_OPENAI_URL);
        if hosted && ApiCredential::load(config, "api_key", OPENAI_API_KEY_ENV).is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "OpenAI API key required: set 'api_key' in config or {} env",
                OPENAI_API_KEY_ENV
            )));
        }

        Ok(())
    }

    fn default_model(&self) -> &'static str {
        "gpt-4o-mini"
    }
}
