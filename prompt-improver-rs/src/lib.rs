//! # Prompt Improver
//!
//! HTTP service that turns a free-text prompt into a structured, professional
//! one in two LLM calls:
//!
//! 1. [`classifier`] extracts a `{role, objective, context}` triple
//! 2. [`improver`] rewrites that triple into the final prompt
//!
//! Both stages share one [`llm_client::LLMClient`], configured once from
//! [`provider::LLMConfig`]. Neither stage returns an error to the HTTP layer:
//! classification falls back to a fixed payload and rewriting reports
//! failures as warning-prefixed text that [`pipeline`] tags for the response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod classifier;
pub mod improver;
pub mod llm_client;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod validation;

#[cfg(test)]
mod tests;

pub use classifier::{Classification, Classifier};
pub use improver::Improver;
pub use pipeline::{ErrorTag, ImprovementResult, Pipeline};
pub use provider::{LLMConfig, Provider};

use validation::{payload_limit_config, validate_prompt, ApiValidationError};

pub const SERVICE_NAME: &str = "prompt-improver";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// `POST /improve` request body
#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub provider: String,
    pub llm_configured: bool,
    pub uptime_seconds: u64,
}

/// Shared service state
pub struct PromptImprover {
    pipeline: Pipeline,
    provider: Provider,
    llm_configured: bool,
    started_at: Instant,
}

impl PromptImprover {
    pub fn new(config: LLMConfig) -> Result<Self, llm_client::LLMError> {
        let provider = config.provider;
        let llm_configured = config.is_configured();
        let pipeline = Pipeline::from_config(config)?;

        Ok(Self {
            pipeline,
            provider,
            llm_configured,
            started_at: Instant::now(),
        })
    }

    /// Create the Axum router with all routes and middleware
    pub fn create_router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", get(Self::root_handler))
            .route("/health", get(Self::health_handler))
            .route("/improve", post(Self::improve_handler))
            .layer(payload_limit_config())
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    async fn root_handler() -> Html<&'static str> {
        Html(INDEX_HTML)
    }

    async fn health_handler(State(state): State<Arc<Self>>) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            provider: state.provider.name().to_string(),
            llm_configured: state.llm_configured,
            uptime_seconds: state.started_at.elapsed().as_secs(),
        })
    }

    async fn improve_handler(
        State(state): State<Arc<Self>>,
        payload: Result<Json<ImproveRequest>, JsonRejection>,
    ) -> Response {
        let Json(request) = match payload {
            Ok(payload) => payload,
            Err(rejection) => {
                let err = ApiValidationError::from(rejection);
                tracing::info!("Rejected improve request: {}", err);
                return err.to_response().into_response();
            }
        };

        let prompt = match validate_prompt(&request.prompt) {
            Ok(prompt) => prompt.to_string(),
            Err(err) => {
                tracing::info!("Rejected improve request: {}", err);
                return err.to_response().into_response();
            }
        };

        tracing::info!(prompt_chars = prompt.chars().count(), "Received improve request");

        // Run on its own task so a panic in either stage becomes an
        // internal_error response instead of a dropped connection
        let task_state = Arc::clone(&state);
        let result = match tokio::spawn(async move {
            task_state.pipeline.run(&prompt).await
        })
        .await
        {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("Improve task failed: {}", err);
                ImprovementResult::internal_error()
            }
        };

        tracing::info!(
            error = result.error.map(|tag| tag.as_str()).unwrap_or("none"),
            "Improve request complete"
        );

        (StatusCode::OK, Json(result)).into_response()
    }
}
