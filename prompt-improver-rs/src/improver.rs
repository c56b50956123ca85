//! Prompt rewriting
//!
//! Turns a `{role, objective, context}` triple into a structured,
//! professional prompt. Failures are returned as ordinary text carrying the
//! [`WARNING_PREFIX`] marker instead of as errors, so the caller can tell them
//! apart with a prefix check.

use crate::llm_client::{ChatMessage, CompletionOptions, LLMClient, LLMError};

/// Leading marker on every error string returned by [`Improver::improve`]
pub const WARNING_PREFIX: &str = "⚠";

/// Sampling temperature for the rewrite call
pub const IMPROVE_TEMPERATURE: f32 = 0.7;

/// Response-length hint for the rewrite call
pub const IMPROVE_MAX_TOKENS: u32 = 1000;

/// Completions shorter than this (after trimming) are treated as garbage
pub const MIN_COMPLETION_CHARS: usize = 10;

const SYSTEM_PROMPT: &str = "You are an expert prompt engineer. Rewrite the user's request \
into a clear, structured and actionable prompt using the given Role, Objective and Context. \
Respond with the improved prompt only.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImproveError {
    #[error("Error: missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Error: API key not configured. Set OPENAI_API_KEY and restart the service.")]
    MissingApiKey,

    #[error("Error: invalid API key. Please check your credentials.")]
    InvalidApiKey,

    #[error("Error: rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    #[error("Error: API error ({0}). Please try again later.")]
    Api(u16),

    #[error("Error: invalid response received from the API.")]
    InvalidResponse,

    #[error("Error: no response received from the API.")]
    NoResponse,

    #[error("Error: empty response received from the API. Please try again.")]
    EmptyResponse,

    #[error("Error: the request timed out. Please try again.")]
    Timeout,

    #[error("Error: could not connect to the API. Please check your network connection.")]
    Connection,

    #[error("Error: network error while contacting the API. Please try again.")]
    Network,
}

impl ImproveError {
    /// Render as a warning-prefixed string
    pub fn to_warning(&self) -> String {
        format!("{} {}", WARNING_PREFIX, self)
    }

    /// True for failures caused by the input triple rather than the upstream
    pub fn is_validation(&self) -> bool {
        matches!(self, ImproveError::MissingField(_))
    }
}

impl From<LLMError> for ImproveError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::MissingApiKey => ImproveError::MissingApiKey,
            LLMError::Timeout(_) => ImproveError::Timeout,
            LLMError::Connection(_) => ImproveError::Connection,
            LLMError::Network(_) => ImproveError::Network,
            LLMError::Unauthorized(_) => ImproveError::InvalidApiKey,
            LLMError::RateLimitExceeded(_) => ImproveError::RateLimited,
            LLMError::Upstream { status, .. } => ImproveError::Api(status),
            LLMError::InvalidJson(_) => ImproveError::InvalidResponse,
            LLMError::NoCompletion => ImproveError::NoResponse,
        }
    }
}

/// Cheap check for a warning-prefixed error string
pub fn is_warning(text: &str) -> bool {
    text.starts_with(WARNING_PREFIX)
}

/// User instruction for the rewrite call. Fields are embedded verbatim.
pub fn format_improvement_request(role: &str, objective: &str, context: &str) -> String {
    format!(
        "Create a professional, well-structured prompt using:\n\n\
         Role: {role}\n\
         Objective: {objective}\n\
         Context: {context}\n\n\
         The prompt should state who the AI is, what it must deliver, the relevant \
         background, and any constraints or output format that make the task actionable."
    )
}

fn require<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ImproveError> {
    if value.trim().is_empty() {
        Err(ImproveError::MissingField(name))
    } else {
        Ok(value)
    }
}

#[derive(Debug, Clone)]
pub struct Improver {
    client: LLMClient,
}

impl Improver {
    pub fn new(client: LLMClient) -> Self {
        Self { client }
    }

    /// Rewrite the triple, returning a typed error on failure
    pub async fn try_improve(
        &self,
        role: &str,
        objective: &str,
        context: &str,
    ) -> Result<String, ImproveError> {
        let role = require("role", role)?;
        let objective = require("objective", objective)?;
        let context = require("context", context)?;

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format_improvement_request(role, objective, context)),
        ];
        let options = CompletionOptions {
            temperature: Some(IMPROVE_TEMPERATURE),
            max_tokens: Some(IMPROVE_MAX_TOKENS),
        };

        let completion = self.client.complete(&messages, options).await.map_err(|err| {
            match &err {
                LLMError::Upstream { status, body } => {
                    tracing::error!(status, "Improve request failed: {}", body)
                }
                other => tracing::warn!(kind = other.kind(), "Improve request failed: {}", other),
            }
            ImproveError::from(err)
        })?;

        let improved = completion.trim();
        if improved.chars().count() < MIN_COMPLETION_CHARS {
            tracing::warn!(
                length = improved.chars().count(),
                "Improve request returned a degenerate completion"
            );
            return Err(ImproveError::EmptyResponse);
        }

        Ok(improved.to_string())
    }

    /// Rewrite the triple. Never fails: errors come back as
    /// warning-prefixed text.
    pub async fn improve(&self, role: &str, objective: &str, context: &str) -> String {
        match self.try_improve(role, objective, context).await {
            Ok(improved) => improved,
            Err(err) => err.to_warning(),
        }
    }
}
