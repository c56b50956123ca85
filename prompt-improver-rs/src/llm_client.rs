// prompt-improver-rs/src/llm_client.rs
//
// HTTP client for the chat-completion call shared by both pipeline stages
//
// This module provides:
// - A single POST per call to an OpenAI-compatible chat completions endpoint
// - Classification of failures into a typed error (credential, network,
//   upstream status, malformed body)
// - No retries: one failed attempt is reported to the caller immediately

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provider::LLMConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Optional sampling parameters; unset values are left out of the request
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Error type for a single completion call
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("No completion returned in response")]
    NoCompletion,
}

impl LLMError {
    /// Category name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            LLMError::MissingApiKey => "credential_missing",
            LLMError::Timeout(_) | LLMError::Connection(_) | LLMError::Network(_) => {
                "network_failure"
            }
            LLMError::Unauthorized(_)
            | LLMError::RateLimitExceeded(_)
            | LLMError::Upstream { .. } => "upstream_http_error",
            LLMError::InvalidJson(_) | LLMError::NoCompletion => "malformed_response",
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout(err.to_string())
        } else if err.is_connect() {
            LLMError::Connection(err.to_string())
        } else {
            LLMError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMClient {
    client: Client,
    config: LLMConfig,
}

impl LLMClient {
    /// Creates a client bound to `config`. The configured timeout bounds both
    /// connection setup and the whole request.
    pub fn new(config: LLMConfig) -> Result<Self, LLMError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|err| LLMError::Network(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self { client, config })
    }

    /// Send one chat completion request and return the first choice's text.
    ///
    /// The text is returned as the provider sent it; callers decide how to
    /// trim or validate it.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, LLMError> {
        let api_key = self.config.api_key.as_deref().ok_or(LLMError::MissingApiKey)?;

        let request_body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!(
            "Sending completion request to {} (provider: {}, model: {})",
            self.config.endpoint,
            self.config.provider,
            self.config.model
        );

        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json");

        for (name, value) in &self.config.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .json(&request_body)
            .send()
            .await
            .map_err(LLMError::from_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(LLMError::from_transport)?;

        if status != StatusCode::OK {
            return Err(match status {
                StatusCode::UNAUTHORIZED => LLMError::Unauthorized(text),
                StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitExceeded(text),
                _ => LLMError::Upstream {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        parse_completion(&text)
    }
}

/// Pull `choices[0].message.content` out of a completion response body.
///
/// Only a body that is not JSON at all is `InvalidJson`; valid JSON without
/// a string at that path is `NoCompletion`.
fn parse_completion(body: &str) -> Result<String, LLMError> {
    let data: Value =
        serde_json::from_str(body).map_err(|err| LLMError::InvalidJson(err.to_string()))?;

    if let Some(total_tokens) = data.pointer("/usage/total_tokens").and_then(Value::as_u64) {
        tracing::debug!("LLM request completed. Used {} tokens", total_tokens);
    }

    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(LLMError::NoCompletion)
}
