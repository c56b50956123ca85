//! Classify → improve pipeline
//!
//! The calling layer of the two stages. It owns the conversion from the
//! improver's typed error into the coarse tag exposed by the HTTP contract.

use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, Classifier};
use crate::improver::{ImproveError, Improver};
use crate::llm_client::{LLMClient, LLMError};
use crate::provider::LLMConfig;

/// Text returned when the request task itself fails
pub const INTERNAL_ERROR_MESSAGE: &str =
    "⚠ Error: an internal error occurred while improving the prompt. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorTag {
    ClassificationError,
    ApiError,
    InternalError,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::ClassificationError => "classification_error",
            ErrorTag::ApiError => "api_error",
            ErrorTag::InternalError => "internal_error",
        }
    }
}

impl From<&ImproveError> for ErrorTag {
    fn from(err: &ImproveError) -> Self {
        if err.is_validation() {
            ErrorTag::ClassificationError
        } else {
            ErrorTag::ApiError
        }
    }
}

/// Response body of `POST /improve`. `improved_prompt` is always set; it
/// describes the failure when `error` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementResult {
    pub improved_prompt: String,
    pub error: Option<ErrorTag>,
}

impl ImprovementResult {
    pub fn success(improved_prompt: impl Into<String>) -> Self {
        Self {
            improved_prompt: improved_prompt.into(),
            error: None,
        }
    }

    pub fn failure(err: &ImproveError) -> Self {
        Self {
            improved_prompt: err.to_warning(),
            error: Some(ErrorTag::from(err)),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            improved_prompt: INTERNAL_ERROR_MESSAGE.to_string(),
            error: Some(ErrorTag::InternalError),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Classifier,
    improver: Improver,
}

impl Pipeline {
    pub fn new(classifier: Classifier, improver: Improver) -> Self {
        Self {
            classifier,
            improver,
        }
    }

    /// Build both stages over one shared client
    pub fn from_config(config: LLMConfig) -> Result<Self, LLMError> {
        let client = LLMClient::new(config)?;
        Ok(Self::new(
            Classifier::new(client.clone()),
            Improver::new(client),
        ))
    }

    /// Run both stages in order for one prompt
    pub async fn run(&self, prompt: &str) -> ImprovementResult {
        let Classification {
            role,
            objective,
            context,
        } = self.classifier.classify(prompt).await;

        tracing::debug!(%role, %objective, %context, "Classification complete");

        match self.improver.try_improve(&role, &objective, &context).await {
            Ok(improved) => ImprovementResult::success(improved),
            Err(err) => {
                let result = ImprovementResult::failure(&err);
                tracing::warn!(
                    tag = result.error.map(|t| t.as_str()).unwrap_or_default(),
                    "Improvement failed: {}",
                    err
                );
                result
            }
        }
    }
}
