// prompt-improver-rs/src/provider.rs
//
// Provider selection and LLM configuration
//
// The provider is chosen once, at startup, from the shape of the API key:
// - gsk_...     -> Groq (OpenAI-compatible endpoint, instant-tier model)
// - sk-or-v1... -> OpenRouter (free-tier model, requires HTTP-Referer)
// - anything else -> OpenAI
//
// Configuration (.env file):
// - OPENAI_API_KEY: API key (LLM_API_KEY is accepted as a fallback)
// - LLM_API_URL: Override the provider's chat completions endpoint
// - LLM_MODEL: Override the provider's default model
// - LLM_TIMEOUT_SECS: Per-call connect/read timeout (default: 30)

use std::env;
use std::fmt;
use std::time::Duration;

/// Default per-call timeout for outbound completion requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Value shipped in `.env.example`; treated the same as no key at all
const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

const GROQ_KEY_PREFIX: &str = "gsk_";
const OPENROUTER_KEY_PREFIX: &str = "sk-or-v1";

/// Referer sent to OpenRouter, which attributes free-tier traffic by origin
const OPENROUTER_REFERER: &str = "http://localhost:8000";

/// Chat-completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenRouter,
    OpenAI,
}

impl Provider {
    /// Select the provider from the API key prefix
    pub fn from_api_key(api_key: Option<&str>) -> Self {
        match api_key {
            Some(key) if key.starts_with(GROQ_KEY_PREFIX) => Provider::Groq,
            Some(key) if key.starts_with(OPENROUTER_KEY_PREFIX) => Provider::OpenRouter,
            _ => Provider::OpenAI,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenRouter => "openrouter",
            Provider::OpenAI => "openai",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            Provider::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::OpenRouter => "google/gemma-2-9b-it:free",
            Provider::OpenAI => "gpt-3.5-turbo",
        }
    }

    /// Headers the provider expects in addition to auth and content type
    pub fn extra_headers(&self) -> Vec<(String, String)> {
        match self {
            Provider::OpenRouter => vec![(
                "HTTP-Referer".to_string(),
                OPENROUTER_REFERER.to_string(),
            )],
            Provider::Groq | Provider::OpenAI => Vec::new(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved configuration for the outbound completion call.
///
/// Built once and handed to both pipeline stages; nothing downstream reads
/// the environment again.
#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub provider: Provider,
    pub endpoint: String,
    pub model: String,
    pub extra_headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl LLMConfig {
    /// Configuration for the provider implied by `api_key`, with that
    /// provider's default endpoint and model
    pub fn for_api_key(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);
        let provider = Provider::from_api_key(api_key.as_deref());

        Self {
            api_key,
            provider,
            endpoint: provider.endpoint().to_string(),
            model: provider.model().to_string(),
            extra_headers: provider.extra_headers(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Creates the configuration from environment variables
    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .or_else(|| env::var("LLM_API_KEY").ok());

        let mut config = Self::for_api_key(api_key);

        if let Ok(url) = env::var("LLM_API_URL") {
            if !url.trim().is_empty() {
                config.endpoint = url.trim().to_string();
            }
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }

        if let Ok(raw) = env::var("LLM_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    "Invalid LLM_TIMEOUT_SECS '{}', using default {}s",
                    raw,
                    DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_api_key() {
        assert_eq!(Provider::from_api_key(Some("gsk_abc123")), Provider::Groq);
        assert_eq!(
            Provider::from_api_key(Some("sk-or-v1-abc123")),
            Provider::OpenRouter
        );
        assert_eq!(Provider::from_api_key(Some("sk-proj-abc")), Provider::OpenAI);
        assert_eq!(Provider::from_api_key(None), Provider::OpenAI);
    }

    #[test]
    fn test_openrouter_sends_referer() {
        let headers = Provider::OpenRouter.extra_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, "HTTP-Referer");
        assert!(Provider::Groq.extra_headers().is_empty());
        assert!(Provider::OpenAI.extra_headers().is_empty());
    }

    #[test]
    fn test_config_for_api_key() {
        let config = LLMConfig::for_api_key(Some("gsk_test".to_string()));
        assert_eq!(config.provider, Provider::Groq);
        assert_eq!(config.endpoint, Provider::Groq.endpoint());
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.is_configured());
    }

    #[test]
    fn test_blank_and_placeholder_keys_are_missing() {
        assert!(!LLMConfig::for_api_key(None).is_configured());
        assert!(!LLMConfig::for_api_key(Some("   ".to_string())).is_configured());
        assert!(!LLMConfig::for_api_key(Some(PLACEHOLDER_API_KEY.to_string())).is_configured());
    }

    #[test]
    fn test_overrides() {
        let config = LLMConfig::for_api_key(Some("sk-test".to_string()))
            .with_endpoint("http://127.0.0.1:9999/v1/chat/completions")
            .with_model("local-model")
            .with_timeout(Duration::from_secs(2));

        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.endpoint, "http://127.0.0.1:9999/v1/chat/completions");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_from_env() {
        // Only this test touches these variables
        for var in [
            "OPENAI_API_KEY",
            "LLM_API_KEY",
            "LLM_API_URL",
            "LLM_MODEL",
            "LLM_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }

        // Nothing set
        let config = LLMConfig::from_env();
        assert!(!config.is_configured());
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.endpoint, Provider::OpenAI.endpoint());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        // LLM_API_KEY is the fallback credential
        std::env::set_var("LLM_API_KEY", "gsk_fallback");
        let config = LLMConfig::from_env();
        assert_eq!(config.provider, Provider::Groq);
        assert_eq!(config.api_key.as_deref(), Some("gsk_fallback"));

        // OPENAI_API_KEY wins over LLM_API_KEY
        std::env::set_var("OPENAI_API_KEY", "sk-or-v1-primary");
        let config = LLMConfig::from_env();
        assert_eq!(config.provider, Provider::OpenRouter);
        assert_eq!(config.api_key.as_deref(), Some("sk-or-v1-primary"));

        // Endpoint, model and timeout overrides
        std::env::set_var("LLM_API_URL", " http://127.0.0.1:9000/v1/chat/completions ");
        std::env::set_var("LLM_MODEL", "local-model");
        std::env::set_var("LLM_TIMEOUT_SECS", "5");
        let config = LLMConfig::from_env();
        assert_eq!(config.provider, Provider::OpenRouter);
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/v1/chat/completions");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout, Duration::from_secs(5));

        // Blank overrides and an unusable timeout keep the defaults
        std::env::set_var("LLM_API_URL", "  ");
        std::env::set_var("LLM_MODEL", "");
        for bad in ["soon", "0", "-3"] {
            std::env::set_var("LLM_TIMEOUT_SECS", bad);
            let config = LLMConfig::from_env();
            assert_eq!(config.endpoint, Provider::OpenRouter.endpoint());
            assert_eq!(config.model, Provider::OpenRouter.model());
            assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        }

        for var in [
            "OPENAI_API_KEY",
            "LLM_API_KEY",
            "LLM_API_URL",
            "LLM_MODEL",
            "LLM_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }
    }
}
