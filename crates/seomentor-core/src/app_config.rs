use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    pub anthropic_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Tried in order when the primary model is unavailable.
    pub llm_fallback_models: Vec<String>,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_detail_max_tokens: u32,
    pub llm_timeout_secs: u64,
    /// Transport-level retries inside a single generative call.
    pub llm_max_retries: u32,
    pub llm_retry_backoff_base_ms: u64,
    /// Total attempts (first try included) for the analysis contract.
    pub synthesis_max_attempts: u32,
    /// Total attempts (first try included) for day detail expansion.
    pub detail_max_attempts: u32,
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    /// Primary model followed by the fallback models, without duplicates.
    #[must_use]
    pub fn model_candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for model in std::iter::once(&self.llm_model).chain(&self.llm_fallback_models) {
            let model = model.trim();
            if !model.is_empty() && !out.iter().any(|m| m == model) {
                out.push(model.to_string());
            }
        }
        out
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("anthropic_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_fallback_models", &self.llm_fallback_models)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("llm_detail_max_tokens", &self.llm_detail_max_tokens)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("llm_retry_backoff_base_ms", &self.llm_retry_backoff_base_ms)
            .field("synthesis_max_attempts", &self.synthesis_max_attempts)
            .field("detail_max_attempts", &self.detail_max_attempts)
            .field(
                "notify_webhook_url",
                &self.notify_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
