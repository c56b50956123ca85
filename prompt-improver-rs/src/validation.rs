//! Request validation for the prompt improver HTTP surface
//!
//! Rejects malformed bodies and prompts too short to be worth classifying
//! before any upstream call is made.

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Maximum request payload size (64KB)
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Minimum prompt length, in characters, after trimming
pub const MIN_PROMPT_CHARS: usize = 3;

/// Error response for validation failures
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Validation error for API requests
#[derive(Debug, thiserror::Error)]
pub enum ApiValidationError {
    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Content type must be {0}")]
    ContentType(String),

    #[error("Request payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Prompt must be at least {min} characters long (got {actual})")]
    PromptTooShort { min: usize, actual: usize },
}

impl ApiValidationError {
    /// Convert to HTTP status code and error response
    pub fn to_response(&self) -> (StatusCode, Json<ValidationErrorResponse>) {
        let status = match self {
            Self::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            Self::ContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PromptTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };

        (
            status,
            Json(ValidationErrorResponse {
                error: self.to_string(),
                code: status.as_u16(),
            }),
        )
    }
}

impl From<JsonRejection> for ApiValidationError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(err) => {
                ApiValidationError::ContentType(format!("application/json ({})", err.body_text()))
            }
            JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiValidationError::PayloadTooLarge(format!(
                    "maximum allowed size is {} bytes",
                    MAX_PAYLOAD_SIZE
                ))
            }
            other => ApiValidationError::InvalidFormat(other.body_text()),
        }
    }
}

/// Check the prompt is long enough; returns the trimmed prompt to process
pub fn validate_prompt(prompt: &str) -> Result<&str, ApiValidationError> {
    let trimmed = prompt.trim();
    let actual = trimmed.chars().count();

    if actual < MIN_PROMPT_CHARS {
        return Err(ApiValidationError::PromptTooShort {
            min: MIN_PROMPT_CHARS,
            actual,
        });
    }

    Ok(trimmed)
}

/// Body limit applied by the extractors, so an oversized body surfaces as a
/// [`JsonRejection`] and gets the JSON error response
pub fn payload_limit_config() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_PAYLOAD_SIZE)
}
