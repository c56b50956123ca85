// prompt-improver-rs/src/main.rs
// Prompt Improver - classify then rewrite user prompts via an LLM provider
// Port 8000 by default - HTTP entry point for the bundled frontend and CLI clients

use std::sync::Arc;

use config_rs::{ServiceConfig, DEFAULT_HTTP_PORT};
use prompt_improver::logging::{init_logging, LoggingConfig};
use prompt_improver::{LLMConfig, PromptImprover, SERVICE_NAME};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let dotenv_loaded = config_rs::load_dotenv();

    init_logging(LoggingConfig::from_env(SERVICE_NAME))?;

    if dotenv_loaded {
        tracing::info!("Loaded configuration from .env");
    }

    let llm_config = LLMConfig::from_env();
    if llm_config.is_configured() {
        tracing::info!(
            "Using provider {} (model: {}, endpoint: {})",
            llm_config.provider,
            llm_config.model,
            llm_config.endpoint
        );
    } else {
        tracing::warn!(
            "No API key configured. Set OPENAI_API_KEY in the .env file; \
             requests will return fallback results until then"
        );
    }

    let service_config = ServiceConfig::new(SERVICE_NAME);
    let addr = service_config.get_bind_address(DEFAULT_HTTP_PORT);

    let app = Arc::new(PromptImprover::new(llm_config)?).create_router();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Prompt Improver listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Prompt Improver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
