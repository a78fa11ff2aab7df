use std::time::Duration;

/// Configuration for the chat-completion endpoint, env-overridable per the
/// engine's process-wide configuration interface.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Reads `TABLEKIT_LLM_BASE_URL`/`TABLEKIT_LLM_API_KEY`/
    /// `TABLEKIT_LLM_MODEL`, falling back to sane defaults for local
    /// development the way `original_source/backend/config.py` falls back
    /// to a default ARK endpoint when unset.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TABLEKIT_LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: std::env::var("TABLEKIT_LLM_API_KEY").unwrap_or_default(),
            model: std::env::var("TABLEKIT_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout: Duration::from_secs(60),
        }
    }
}
