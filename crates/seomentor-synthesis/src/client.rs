//! Client for the Anthropic Messages API behind the [`TextGenerator`] seam.
//!
//! One call walks the configured model list in order. Each model gets the
//! transport retry budget; a model that is not served moves the call on to
//! the next candidate, and any other failure ends the call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use seomentor_core::AppConfig;

use crate::error::GenerateError;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Anthropic's "overloaded" status.
const STATUS_OVERLOADED: u16 = 529;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// A generative text service returning one completion per request.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`GenerateError`] categorized as timeout, transient,
    /// model-unavailable, or fatal.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    models: Vec<String>,
    temperature: f32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Creates a client pointed at the production Anthropic API.
    ///
    /// # Errors
    ///
    /// See [`Self::with_base_url`].
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GenerateError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Defaults: model `claude-3-5-sonnet-latest`, temperature 0.2, two
    /// transport retries with a 1 s back-off base.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GenerateError::Fatal`] if `base_url` is not a URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent("seomentor/0.1 (synthesis)")
            .build()?;

        let normalised = format!("{}/v1/messages", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised).map_err(|e| GenerateError::Fatal {
            status: None,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            models: vec!["claude-3-5-sonnet-latest".to_owned()],
            temperature: 0.2,
            max_retries: 2,
            backoff_base_ms: 1_000,
        })
    }

    /// # Errors
    ///
    /// See [`Self::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerateError> {
        Ok(Self::with_base_url(
            &config.anthropic_api_key,
            config.llm_timeout_secs,
            &config.llm_base_url,
        )?
        .with_models(config.model_candidates())
        .with_temperature(config.llm_temperature)
        .with_retry(config.llm_max_retries, config.llm_retry_backoff_base_ms))
    }

    /// Ordered model candidates. An empty list keeps the current one.
    #[must_use]
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
        }
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    async fn send_once(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, GenerateError> {
        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens,
            temperature: self.temperature,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(model, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(model, &e))?;

        if !status.is_success() {
            return Err(classify_status(model, status, &text));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| GenerateError::Deserialize {
                context: format!("messages response from {model}"),
                source: e,
            })?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(model, "completion hit max_tokens and may be truncated");
        }

        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<String>()
            .trim()
            .to_owned())
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let mut last_unavailable = None;
        for model in &self.models {
            let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.send_once(model, request)
            })
            .await;
            match result {
                Ok(text) => {
                    tracing::debug!(model, chars = text.len(), "generation succeeded");
                    return Ok(text);
                }
                Err(err @ GenerateError::ModelUnavailable { .. }) => {
                    tracing::warn!(model, error = %err, "model unavailable, trying next candidate");
                    last_unavailable = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_unavailable.unwrap_or(GenerateError::Fatal {
            status: None,
            message: "no models configured".to_owned(),
        }))
    }
}

fn transport_error(model: &str, err: &reqwest::Error) -> GenerateError {
    if err.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::Transient {
            model: model.to_owned(),
            reason: err.to_string(),
        }
    }
}

fn error_detail(body: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

pub(crate) fn classify_status(model: &str, status: StatusCode, body: &str) -> GenerateError {
    let detail = error_detail(body);
    let reason = detail.as_ref().map_or_else(
        || format!("HTTP {}", status.as_u16()),
        |d| format!("HTTP {} {}: {}", status.as_u16(), d.kind, d.message),
    );

    let not_found = status == StatusCode::NOT_FOUND
        || detail.as_ref().is_some_and(|d| d.kind == "not_found_error");
    if not_found {
        return GenerateError::ModelUnavailable {
            model: model.to_owned(),
            reason,
        };
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
        || status.as_u16() == STATUS_OVERLOADED
    {
        return GenerateError::Transient {
            model: model.to_owned(),
            reason,
        };
    }

    GenerateError::Fatal {
        status: Some(status.as_u16()),
        message: reason,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
