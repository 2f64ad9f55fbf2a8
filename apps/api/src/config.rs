use anyhow::{bail, Context, Result};

/// Which completion backend serves review prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

impl LlmProvider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" | "local" => Ok(Self::Ollama),
            other => bail!("LLM_PROVIDER must be 'anthropic' or 'ollama', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected provider is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: LlmProvider,
    pub anthropic_api_key: Option<String>,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Caller-side timeout for a single backend call. The review core has none.
    pub llm_timeout_secs: u64,
    /// Cap on job-description keywords forwarded into the review prompt.
    pub keyword_limit: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_provider = LlmProvider::parse(&env_or("LLM_PROVIDER", "ollama"))?;
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        if llm_provider == LlmProvider::Anthropic && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set");
        }

        Ok(Config {
            llm_provider,
            anthropic_api_key,
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: env_or("OLLAMA_MODEL", "mistral"),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            keyword_limit: parse_env("KEYWORD_LIMIT", 20)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
