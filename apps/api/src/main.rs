mod config;
mod document;
mod errors;
mod llm_client;
mod review;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LlmProvider};
use crate::llm_client::{AnthropicClient, CompletionBackend, OllamaClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing provider key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Review API v{}", env!("CARGO_PKG_VERSION"));

    let backend = build_backend(&config)?;
    info!("Completion backend initialized ({})", backend.name());

    let state = AppState {
        backend,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the completion backend named by `LLM_PROVIDER`.
fn build_backend(config: &Config) -> Result<Arc<dyn CompletionBackend>> {
    let timeout = Duration::from_secs(config.llm_timeout_secs);
    let backend: Arc<dyn CompletionBackend> = match config.llm_provider {
        LlmProvider::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is required for the anthropic provider"))?;
            Arc::new(AnthropicClient::new(api_key, timeout)?)
        }
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            &config.ollama_url,
            &config.ollama_model,
            timeout,
        )?),
    };
    Ok(backend)
}
