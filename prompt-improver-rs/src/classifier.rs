//! Prompt classification
//!
//! Asks the LLM to split a free-text prompt into a `{role, objective, context}`
//! triple. Classification never fails from the caller's point of view: any
//! error is logged and replaced with a fixed fallback payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::{ChatMessage, CompletionOptions, LLMClient, LLMError};

pub const DEFAULT_ROLE: &str = "assistant";
pub const DEFAULT_OBJECTIVE: &str = "help with the request";
pub const DEFAULT_CONTEXT: &str = "general assistance";

/// JSON form of [`Classification::fallback`]
pub const FALLBACK_JSON: &str =
    r#"{"role":"assistant","objective":"help with the request","context":"general assistance"}"#;

const CODE_FENCE: &str = "```";

/// Structured reading of a user prompt. All fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub role: String,
    pub objective: String,
    pub context: String,
}

impl Classification {
    pub fn fallback() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            objective: DEFAULT_OBJECTIVE.to_string(),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Decode a JSON object, substituting defaults for fields that are
    /// absent, empty or not strings
    pub fn from_value(value: &Value) -> Result<Self, ClassifyError> {
        let object = value.as_object().ok_or(ClassifyError::NotAnObject)?;

        let field = |name: &str, default: &str| -> String {
            object
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Ok(Self {
            role: field("role", DEFAULT_ROLE),
            objective: field("objective", DEFAULT_OBJECTIVE),
            context: field("context", DEFAULT_CONTEXT),
        })
    }

    /// Compact JSON with exactly the keys `role`, `objective`, `context`
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_JSON.to_string())
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::fallback()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("completion failed: {0}")]
    Completion(#[from] LLMError),

    #[error("malformed classification JSON: {0}")]
    MalformedJson(String),

    #[error("classification JSON is not an object")]
    NotAnObject,
}

/// Build the instruction sent to the LLM. The prompt is embedded verbatim.
pub fn build_classification_prompt(user_prompt: &str) -> String {
    format!(
        r#"You are a prompt analysis system. You MUST respond with valid JSON only.

Analyze this prompt and extract:
- Role (who the AI should act as)
- Objective (what the user wants)
- Context (additional details)

Respond with ONLY this JSON format (no other text):
{{"role": "...", "objective": "...", "context": "..."}}

User prompt: {user_prompt}
"#
    )
}

/// Trim the completion and, when it is wrapped in a markdown code fence,
/// keep only the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.contains(CODE_FENCE) {
        return trimmed;
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    client: LLMClient,
}

impl Classifier {
    pub fn new(client: LLMClient) -> Self {
        Self { client }
    }

    /// Classify `user_prompt`, surfacing the failure reason
    pub async fn try_classify(&self, user_prompt: &str) -> Result<Classification, ClassifyError> {
        let messages = [ChatMessage::user(build_classification_prompt(user_prompt))];
        let completion = self
            .client
            .complete(&messages, CompletionOptions::default())
            .await?;

        let candidate = extract_json(&completion);
        let value: Value = serde_json::from_str(candidate)
            .map_err(|err| ClassifyError::MalformedJson(err.to_string()))?;

        Classification::from_value(&value)
    }

    /// Classify `user_prompt`, falling back to [`Classification::fallback`]
    /// on any error
    pub async fn classify(&self, user_prompt: &str) -> Classification {
        match self.try_classify(user_prompt).await {
            Ok(classification) => {
                tracing::debug!(
                    role = %classification.role,
                    objective = %classification.objective,
                    "Prompt classified"
                );
                classification
            }
            Err(err) => {
                let kind = match &err {
                    ClassifyError::Completion(inner) => inner.kind(),
                    _ => "malformed_response",
                };
                tracing::warn!(kind, "Classification failed, using fallback: {}", err);
                Classification::fallback()
            }
        }
    }

    /// Classification as validated JSON text
    pub async fn classify_json(&self, user_prompt: &str) -> String {
        self.classify(user_prompt).await.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_json_matches_fallback() {
        assert_eq!(Classification::fallback().to_json(), FALLBACK_JSON);
        let parsed: Classification = serde_json::from_str(FALLBACK_JSON).unwrap();
        assert_eq!(parsed, Classification::fallback());
    }

    #[test]
    fn test_prompt_embeds_input_verbatim() {
        let input = "Write {a} \"poem\"\nabout rust";
        let prompt = build_classification_prompt(input);
        assert!(prompt.contains(&format!("User prompt: {}", input)));
        assert!(prompt.contains(r#"{"role": "...", "objective": "...", "context": "..."}"#));
    }

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "Here you go:\n```json\n{\"role\": \"chef\"}\n```\nEnjoy!";
        assert_eq!(extract_json(text), "{\"role\": \"chef\"}");
    }

    #[test]
    fn test_extract_json_fence_without_braces() {
        let text = "```\nno json here\n```";
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_prose_without_fence_is_left_alone() {
        let text = "Sure! {\"role\": \"chef\"}";
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_from_value_substitutes_defaults() {
        let value = json!({"role": "  ", "objective": 42});
        let classification = Classification::from_value(&value).unwrap();
        assert_eq!(classification.role, DEFAULT_ROLE);
        assert_eq!(classification.objective, DEFAULT_OBJECTIVE);
        assert_eq!(classification.context, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_from_value_keeps_content() {
        let value = json!({
            "role": "senior chef",
            "objective": "plan a menu",
            "context": "vegan dinner for 6"
        });
        let classification = Classification::from_value(&value).unwrap();
        assert_eq!(classification.role, "senior chef");
        assert_eq!(classification.objective, "plan a menu");
        assert_eq!(classification.context, "vegan dinner for 6");
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(matches!(
            Classification::from_value(&json!(["role"])),
            Err(ClassifyError::NotAnObject)
        ));
        assert!(matches!(
            Classification::from_value(&json!("text")),
            Err(ClassifyError::NotAnObject)
        ));
    }

    #[test]
    fn test_to_json_has_exactly_three_keys() {
        let json: Value = serde_json::from_str(&Classification::fallback().to_json()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("role").is_some());
        assert!(json.get("objective").is_some());
        assert!(json.get("context").is_some());
    }
}
