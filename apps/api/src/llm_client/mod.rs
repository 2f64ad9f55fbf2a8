/// LLM client: the single point of entry for all completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a model API directly.
/// Review code depends only on `CompletionBackend`, never on a concrete provider.
use async_trait::async_trait;
use thiserror::Error;

pub mod anthropic;
pub mod ollama;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A text-completion capability: prompt in, raw text out.
///
/// The returned text is schema-agnostic and may be malformed or truncated;
/// callers are expected to run it through the review normalizer.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short label for logs and responses, e.g. `"ollama:mistral"`.
    fn name(&self) -> &str;
}
