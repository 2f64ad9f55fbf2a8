use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Selected at startup from `LLM_PROVIDER`.
    pub backend: Arc<dyn CompletionBackend>,
    pub config: Config,
}
