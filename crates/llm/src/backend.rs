//! LLM backend implementations
//!
//! Both backends make a single non-streaming chat request per call with no
//! retries. A failed call is reported once and the caller falls back.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use loan_assist_config::constants::{endpoints, timeouts};

use crate::prompt::Message;
use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Base URL
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            endpoint: endpoints::OPENAI_DEFAULT.to_string(),
            api_key: None,
            max_tokens: 200,
            temperature: 0.5,
            timeout: Duration::from_millis(timeouts::LLM_MS),
        }
    }
}

/// Generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    /// Tokens generated, when the backend reports them
    pub tokens: usize,
    pub total_time_ms: u64,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
}

impl FinishReason {
    fn from_api(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => FinishReason::Length,
            _ => FinishReason::Stop,
        }
    }
}

/// Chat backend
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

fn build_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)))
}

// Ollama

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    eval_count: Option<usize>,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Ollama backend (`POST /api/chat`)
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!("{}/api/chat", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = OllamaChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self.client.post(self.api_url()).json(&request).send().await?;
        let response: OllamaChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(GenerationResult {
            text: response.message.content,
            tokens: response.eval_count.unwrap_or(0),
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason: FinishReason::from_api(response.done_reason.as_deref()),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI-compatible

#[derive(Debug, Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    completion_tokens: usize,
}

/// OpenAI-compatible backend (`POST {endpoint}/chat/completions`)
///
/// Works with OpenAI, hosted OpenAI-compatible APIs and local servers.
pub struct OpenAIBackend {
    client: Client,
    config: LlmConfig,
}

impl OpenAIBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let has_key = config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        let local = config.endpoint.starts_with("http://localhost")
            || config.endpoint.starts_with("http://127.0.0.1");
        if !has_key && !local {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = build_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = OpenAIChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let mut builder = self.client.post(self.chat_url()).json(&request);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response: OpenAIChatResponse = check_status(builder.send().await?)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(GenerationResult {
            text: choice.message.content.unwrap_or_default(),
            tokens: response.usage.map(|u| u.completion_tokens).unwrap_or(0),
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptBuilder;

    fn unreachable_config() -> LlmConfig {
        LlmConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    #[test]
    fn test_openai_requires_key_for_remote() {
        assert!(matches!(
            OpenAIBackend::new(LlmConfig::default()),
            Err(LlmError::Configuration(_))
        ));
        assert!(OpenAIBackend::new(unreachable_config()).is_ok());
    }

    #[test]
    fn test_urls() {
        let config = LlmConfig {
            endpoint: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let ollama = OllamaBackend::new(config.clone()).unwrap();
        assert_eq!(ollama.api_url(), "http://localhost:11434/api/chat");
        let openai = OpenAIBackend::new(config).unwrap();
        assert_eq!(openai.chat_url(), "http://localhost:11434/chat/completions");
    }

    #[test]
    fn test_openai_request_shape() {
        let messages = PromptBuilder::advisor().user("hi").build();
        let request = OpenAIChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            max_tokens: 200,
            temperature: 0.5,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_openai_response_parsing() {
        let response: OpenAIChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Pay on time."},"finish_reason":"length"}],"usage":{"completion_tokens":4,"prompt_tokens":10,"total_tokens":14}}"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Pay on time."));
        assert_eq!(
            FinishReason::from_api(response.choices[0].finish_reason.as_deref()),
            FinishReason::Length
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_errors() {
        let backend = OllamaBackend::new(unreachable_config()).unwrap();
        let result = backend.generate(&[Message::user("hi")]).await;
        assert!(matches!(result, Err(LlmError::Network(_)) | Err(LlmError::Timeout)));
    }
}
