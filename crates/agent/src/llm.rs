//! The language-model boundary.
//!
//! Responders speak to the model through the `LlmClient` trait only, so
//! tests can script responses and the provider can be swapped by
//! configuration. `HttpLlmClient` covers the three supported providers
//! behind their chat-completion HTTP APIs.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use leadwise_core::config::{LlmConfig, LlmProvider};

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;
const RETRY_BASE_DELAY_MS: u64 = 200;

/// One completion request: a system instruction and an optional user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: Option<String>,
}

impl Prompt {
    pub fn system_only(system: impl Into<String>) -> Self {
        Self { system: system.into(), user: None }
    }

    pub fn with_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: Some(user.into()) }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Transport(String),
    #[error("llm returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("llm response had no completion text")]
    EmptyResponse,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

/// HTTP client over the provider chat APIs, with bounded retries on
/// transport failures.
pub struct HttpLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        match self.config.provider {
            LlmProvider::OpenAi => {
                let base = self.base_url_or(OPENAI_DEFAULT_BASE_URL);
                format!("{base}/v1/chat/completions")
            }
            LlmProvider::Anthropic => {
                let base = self.base_url_or(ANTHROPIC_DEFAULT_BASE_URL);
                format!("{base}/v1/messages")
            }
            LlmProvider::Ollama => {
                let base = self.base_url_or("http://localhost:11434");
                format!("{base}/api/chat")
            }
        }
    }

    fn base_url_or(&self, fallback: &str) -> String {
        self.config
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn request_body(&self, prompt: &Prompt) -> Value {
        match self.config.provider {
            LlmProvider::OpenAi | LlmProvider::Ollama => {
                let mut messages = vec![json!({"role": "system", "content": prompt.system})];
                if let Some(user) = &prompt.user {
                    messages.push(json!({"role": "user", "content": user}));
                }
                let mut body = json!({
                    "model": self.config.model,
                    "messages": messages,
                });
                if self.config.provider == LlmProvider::Ollama {
                    body["stream"] = json!(false);
                }
                body
            }
            LlmProvider::Anthropic => {
                let user = prompt.user.as_deref().unwrap_or("Respond to the instructions.");
                json!({
                    "model": self.config.model,
                    "max_tokens": ANTHROPIC_MAX_TOKENS,
                    "system": prompt.system,
                    "messages": [{"role": "user", "content": user}],
                })
            }
        }
    }

    async fn send_once(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut request = self.http.post(self.endpoint()).json(&self.request_body(prompt));

        if let Some(api_key) = &self.config.api_key {
            request = match self.config.provider {
                LlmProvider::Anthropic => request.header("x-api-key", api_key.expose_secret()),
                _ => request.bearer_auth(api_key.expose_secret()),
            };
        }
        if self.config.provider == LlmProvider::Anthropic {
            request = request.header("anthropic-version", ANTHROPIC_VERSION);
        }

        let response =
            request.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = response.status();
        let body: Value =
            response.json().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error")
                .to_string();
            return Err(LlmError::Api { status: status.as_u16(), message });
        }

        extract_completion(self.config.provider, &body)
    }
}

fn extract_completion(provider: LlmProvider, body: &Value) -> Result<String, LlmError> {
    let text = match provider {
        LlmProvider::OpenAi => body.pointer("/choices/0/message/content").and_then(Value::as_str),
        LlmProvider::Anthropic => body.pointer("/content/0/text").and_then(Value::as_str),
        LlmProvider::Ollama => body.pointer("/message/content").and_then(Value::as_str),
    };

    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::EmptyResponse),
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(prompt).await {
                Ok(text) => {
                    debug!(chars = text.len(), "llm completion received");
                    return Ok(text);
                }
                // Only transport failures are retried; API rejections are
                // deterministic and retrying them just burns quota.
                Err(LlmError::Transport(message)) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %message, "llm transport failure, retrying");
                    tokio::time::sleep(Duration::from_millis(
                        RETRY_BASE_DELAY_MS * u64::from(attempt),
                    ))
                    .await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
