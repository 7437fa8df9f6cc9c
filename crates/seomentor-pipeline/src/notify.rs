//! Outbound delivery of rendered plan reports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use seomentor_core::{AnalysisArtifact, AppConfig, PlanReport, Project};

use crate::error::NotifyError;

const WEBHOOK_TIMEOUT_SECS: u64 = 15;

/// Delivers a rendered report for one project to a recipient.
#[async_trait]
pub trait PlanNotifier: Send + Sync {
    /// Returns a human-readable delivery confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery is not possible or is rejected.
    async fn send(
        &self,
        recipient: &str,
        report: &PlanReport,
        project: &Project,
    ) -> Result<String, NotifyError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
    project_id: i64,
    url: &'a str,
    artifact: &'a AnalysisArtifact,
}

/// Posts the report as JSON to a configured webhook.
///
/// Without a url every send fails with [`NotifyError::NotConfigured`].
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(url: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()?;
        let url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        Ok(Self { client, url })
    }

    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        Self::new(config.notify_webhook_url.clone())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl PlanNotifier for WebhookNotifier {
    async fn send(
        &self,
        recipient: &str,
        report: &PlanReport,
        project: &Project,
    ) -> Result<String, NotifyError> {
        let url = self.url.as_deref().ok_or(NotifyError::NotConfigured)?;

        let payload = WebhookPayload {
            recipient,
            subject: &report.subject,
            body: &report.body,
            project_id: project.id,
            url: &project.url,
            artifact: &project.artifact,
        };

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(project_id = project.id, status = status.as_u16(), "notification webhook rejected report");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(project_id = project.id, "plan report delivered");
        Ok(format!("Plan for project {} sent to {recipient}", project.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_counts_as_unconfigured() {
        assert!(!WebhookNotifier::new(None).unwrap().is_configured());
        assert!(!WebhookNotifier::new(Some("  ".to_string()))
            .unwrap()
            .is_configured());
        assert!(WebhookNotifier::new(Some("https://hooks.example/x".to_string()))
            .unwrap()
            .is_configured());
    }
}
