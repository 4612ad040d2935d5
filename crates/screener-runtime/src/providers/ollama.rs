//! Ollama provider for locally hosted models.
//!
//! Talks to the `/api/chat` endpoint with streaming disabled, so each call
//! returns one complete message.

use super::{
    factory::ProviderFactory, map_send_error, one_line, retry_after, ChatMessage,
    CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Environment variable Ollama itself uses for its listen address.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Ollama chat provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the given server address.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from JSON configuration.
    ///
    /// Address resolution order: `base_url` in config, `OLLAMA_HOST`,
    /// then [`DEFAULT_OLLAMA_URL`].
    pub fn from_config(config: &JsonValue) -> Self {
        let base_url = config["base_url"]
            .as_str()
            .map(str::to_string)
            .or_else(|| std::env::var(OLLAMA_HOST_ENV).ok().map(|h| normalize_host(&h)))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let provider = Self::new(base_url);
        debug!(base_url = %provider.base_url, "Ollama provider configured");
        provider
    }
}

/// `OLLAMA_HOST` is often given without a scheme ("127.0.0.1:11434").
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama chat response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

fn build_request<'a>(messages: &'a [ChatMessage], config: &'a CompletionConfig) -> OllamaRequest<'a> {
    OllamaRequest {
        model: &config.model,
        messages,
        stream: false,
        format: config.json_mode.then_some("json"),
        options: OllamaOptions {
            temperature: config.temperature,
            num_predict: config.max_tokens,
        },
    }
}

impl From<OllamaResponse> for CompletionResponse {
    fn from(body: OllamaResponse) -> Self {
        CompletionResponse {
            content: body.message.content,
            usage: TokenUsage {
                prompt_tokens: body.prompt_eval_count,
                completion_tokens: body.eval_count,
            },
            model: body.model,
            stop_reason: body.done_reason,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = build_request(&messages, config);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, config.timeout))?;

        let status = response.status();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after: retry_after(&response),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: one_line(&message),
            });
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(body.into())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Factory for creating Ollama providers from configuration.
///
/// ## Configuration Format
/// ```json
/// {
///   "base_url": "http://localhost:11434"   // Optional
/// }
/// ```
pub struct OllamaProviderFactory;

impl ProviderFactory for OllamaProviderFactory {
    fn provider_type(&self) -> &'static str {
        "ollama"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OllamaProvider::from_config(config)))
    }

    fn default_model(&self) -> &'static str {
        "llama3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let messages = vec![ChatMessage::user("Evaluate")];
        let config = CompletionConfig {
            model: "llama3".to_string(),
            json_mode: true,
            ..CompletionConfig::default()
        };

        let body = serde_json::to_value(build_request(&messages, &config)).unwrap();

        assert_eq!(body["model"], "llama3");
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Evaluate");
        assert_eq!(body["options"]["num_predict"], 1024);
    }

    #[test]
    fn test_request_body_without_json_mode() {
        let messages = vec![ChatMessage::user("Evaluate")];
        let config = CompletionConfig::default();

        let body = serde_json::to_value(build_request(&messages, &config)).unwrap();
        assert!(body.get("format").is_none());
    }

    #[test]
    fn test_response_decoding() {
        let json = r#"{
            "model": "llama3",
            "created_at": "2024-05-01T12:00:00Z",
            "message": {"role": "assistant", "content": "{\"match_score\": 70}"},
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 412,
            "eval_count": 96
        }"#;

        let body: OllamaResponse = serde_json::from_str(json).unwrap();
        let response = CompletionResponse::from(body);

        assert_eq!(response.content, "{\"match_score\": 70}");
        assert_eq!(response.model, "llama3");
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.total(), 508);
    }

    #[test]
    fn test_error_decoding() {
        let err: OllamaError =
            serde_json::from_str(r#"{"error": "model 'llama9' not found"}"#).unwrap();
        assert!(err.error.contains("not found"));
    }

    #[test]
    fn test_base_url_from_config() {
        let provider = OllamaProvider::from_config(&serde_json::json!({
            "base_url": "http://gpu-box:11434/"
        }));
        assert_eq!(provider.base_url, "http://gpu-box:11434");
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("127.0.0.1:11434"), "http://127.0.0.1:11434");
        assert_eq!(normalize_host("https://ollama.internal"), "https://ollama.internal");
    }

    #[test]
    fn test_factory() {
        let factory = OllamaProviderFactory;
        assert_eq!(factory.provider_type(), "ollama");
        assert_eq!(factory.default_model(), "llama3");
        assert!(factory.validate_config(&serde_json::json!({"base_url": "ftp://x"})).is_err());
        assert!(factory.validate_config(&serde_json::json!({})).is_ok());
        assert!(factory.create(&serde_json::json!({})).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // Port 9 (discard) is closed on test machines.
        let provider = OllamaProvider::new("http://127.0.0.1:9");
        let config = CompletionConfig {
            timeout: std::time::Duration::from_secs(5),
            ..CompletionConfig::default()
        };

        let result = provider
            .complete(vec![ChatMessage::user("hi")], &config)
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::HttpError(_)) | Err(ProviderError::Timeout(_))
        ));
    }
}
