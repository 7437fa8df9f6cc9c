use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use seomentor_core::AppConfig;

use crate::error::ExtractError;

/// Retrieves the raw document body for one url.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the document cannot be retrieved.
    async fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}

/// reqwest-backed fetcher. Follows redirects and never retries.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractError> {
        Self::new(config.fetch_timeout_secs, &config.fetch_user_agent)
    }
}

/// Markup-ish types only. A missing header is accepted.
fn is_text_content(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/") || essence.contains("html") || essence.ends_with("+xml")
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| ExtractError::Request {
                    url: url.to_owned(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_text_content(content_type) {
                return Err(ExtractError::UnsupportedContentType {
                    content_type: content_type.to_owned(),
                    url: url.to_owned(),
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|source| ExtractError::Request {
                url: url.to_owned(),
                source,
            })?;
        tracing::debug!(url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
