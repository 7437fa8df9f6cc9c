use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f32 = |var: &str, default: &str| -> Result<f32, ConfigError> {
        or_default(var, default)
            .parse::<f32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_attempts = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_u32(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let anthropic_api_key = require("ANTHROPIC_API_KEY")?;

    let env = parse_environment(&or_default("SEOMENTOR_ENV", "development"))?;
    let bind_addr = parse_addr("SEOMENTOR_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SEOMENTOR_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SEOMENTOR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SEOMENTOR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SEOMENTOR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("SEOMENTOR_FETCH_TIMEOUT_SECS", "10")?;
    let fetch_user_agent = or_default(
        "SEOMENTOR_FETCH_USER_AGENT",
        "seomentor/0.1 (homepage-audit)",
    );

    let llm_base_url = or_default("SEOMENTOR_LLM_BASE_URL", "https://api.anthropic.com");
    let llm_model = or_default("SEOMENTOR_LLM_MODEL", "claude-3-5-sonnet-latest");
    let llm_fallback_models = or_default("SEOMENTOR_LLM_FALLBACK_MODELS", "claude-3-haiku-20240307")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let llm_temperature = parse_f32("SEOMENTOR_LLM_TEMPERATURE", "0.2")?;
    if !(0.0..=1.0).contains(&llm_temperature) {
        return Err(invalid(
            "SEOMENTOR_LLM_TEMPERATURE",
            format!("must be within 0.0..=1.0, got {llm_temperature}"),
        ));
    }
    let llm_max_tokens = parse_u32("SEOMENTOR_LLM_MAX_TOKENS", "3200")?;
    let llm_detail_max_tokens = parse_u32("SEOMENTOR_LLM_DETAIL_MAX_TOKENS", "900")?;
    let llm_timeout_secs = parse_u64("SEOMENTOR_LLM_TIMEOUT_SECS", "60")?;
    let llm_max_retries = parse_u32("SEOMENTOR_LLM_MAX_RETRIES", "2")?;
    let llm_retry_backoff_base_ms = parse_u64("SEOMENTOR_LLM_RETRY_BACKOFF_BASE_MS", "1000")?;

    let synthesis_max_attempts = parse_attempts("SEOMENTOR_SYNTHESIS_MAX_ATTEMPTS", "3")?;
    let detail_max_attempts = parse_attempts("SEOMENTOR_DETAIL_MAX_ATTEMPTS", "2")?;

    let notify_webhook_url = lookup("SEOMENTOR_NOTIFY_WEBHOOK_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_user_agent,
        anthropic_api_key,
        llm_base_url,
        llm_model,
        llm_fallback_models,
        llm_temperature,
        llm_max_tokens,
        llm_detail_max_tokens,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_backoff_base_ms,
        synthesis_max_attempts,
        detail_max_attempts,
        notify_webhook_url,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SEOMENTOR_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
