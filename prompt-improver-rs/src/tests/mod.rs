//! Tests for the prompt improver service
//!
//! These tests run the pipeline stages and the HTTP router against a WireMock
//! server standing in for the chat completions provider.


use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;

use crate::provider::LLMConfig;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const TEST_API_KEY: &str = "sk-mock_api_key_for_testing";

/// Configuration pointing at the mock server with a short timeout
pub fn test_config(mock_server: &MockServer) -> LLMConfig {
    config_for_key(mock_server, TEST_API_KEY)
}

pub fn config_for_key(mock_server: &MockServer, api_key: &str) -> LLMConfig {
    LLMConfig::for_api_key(Some(api_key.to_string()))
        .with_endpoint(format!("{}{}", mock_server.uri(), COMPLETIONS_PATH))
        .with_timeout(Duration::from_secs(1))
}

/// A well-formed chat completion response carrying `content`
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock123",
        "object": "chat.completion",
        "created": 1677858242,
        "model": "gpt-3.5-turbo",
        "usage": {
            "prompt_tokens": 13,
            "completion_tokens": 7,
            "total_tokens": 20
        },
        "choices": [
            {
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop",
                "index": 0
            }
        ]
    })
}
