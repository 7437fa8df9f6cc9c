//! Orchestration of the analysis lifecycle over the extractor, the synthesis
//! contract, the artifact store, and notification delivery.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use seomentor_core::{
    render_plan_report, validate_email, AnalysisRequest, AppConfig, DetailRecord, MonthGrid,
    PlanCalendar, PlanReport, Project, ProjectSummary, YearMonth,
};
use seomentor_db::ArtifactStore;
use seomentor_scraper::{extract_signals, HttpPageFetcher, PageFetcher};
use seomentor_synthesis::{
    AnthropicClient, DetailExpander, SynthesisContract, SynthesisError, TextGenerator,
};

use crate::error::{NotifyError, PipelineError};
use crate::notify::{PlanNotifier, WebhookNotifier};

/// One month of a project's plan, with navigation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub project_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub plan_days: u32,
    /// Every month touching the plan, in order.
    pub months: Vec<YearMonth>,
    pub grid: MonthGrid,
    pub prev_month: Option<YearMonth>,
    pub next_month: Option<YearMonth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub sent: bool,
    pub message: String,
}

pub struct AnalysisService {
    fetcher: Arc<dyn PageFetcher>,
    contract: SynthesisContract,
    expander: DetailExpander,
    store: Arc<dyn ArtifactStore>,
    notifier: Option<Arc<dyn PlanNotifier>>,
}

impl AnalysisService {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        contract: SynthesisContract,
        expander: DetailExpander,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            fetcher,
            contract,
            expander,
            store,
            notifier: None,
        }
    }

    /// Wire the production collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self, PipelineError> {
        let fetcher = HttpPageFetcher::from_config(config)?;
        let generator: Arc<dyn TextGenerator> = Arc::new(
            AnthropicClient::from_config(config).map_err(SynthesisError::Generation)?,
        );
        let notifier = WebhookNotifier::from_config(config)?;
        if !notifier.is_configured() {
            tracing::info!("notification webhook not configured; plan delivery disabled");
        }

        Ok(Self::new(
            Arc::new(fetcher),
            SynthesisContract::from_config(Arc::clone(&generator), config),
            DetailExpander::from_config(generator, config),
            store,
        )
        .with_notifier(Arc::new(notifier)))
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn PlanNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Validate, fetch, extract, synthesize, then store. Nothing is written
    /// unless every earlier step succeeded.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] before any fetch or generative call.
    /// - [`PipelineError::Extraction`] before any generative call.
    /// - [`PipelineError::Synthesis`] when no valid artifact was produced.
    /// - [`PipelineError::Storage`] if the write fails.
    pub async fn create_analysis(&self, request: AnalysisRequest) -> Result<i64, PipelineError> {
        let context = request.into_context()?;
        tracing::info!(url = %context.url, plan_days = context.plan_days, "analysis started");

        let body = self.fetcher.fetch(&context.url).await.inspect_err(|e| {
            tracing::warn!(url = %context.url, error = %e, "page fetch failed");
        })?;
        let signals = extract_signals(&body, &context.url)?;

        let artifact = self.contract.synthesize(&signals, &context).await?;

        let id = self
            .store
            .create(&context, &artifact)
            .await
            .map_err(PipelineError::Storage)?;
        tracing::info!(project_id = id, url = %context.url, score = artifact.seo_score, "analysis stored");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id.
    pub async fn get_analysis(&self, id: i64) -> Result<Project, PipelineError> {
        self.store
            .get(id)
            .await
            .map_err(|e| PipelineError::from_store(e, format!("project {id}")))
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if the listing fails.
    pub async fn list_analyses(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<ProjectSummary>, PipelineError> {
        self.store.list(limit).await.map_err(PipelineError::Storage)
    }

    /// Detail for one roadmap day, served from cache unless `refresh` is set.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] for an unknown project or a day outside
    ///   the roadmap, before any generative call.
    /// - [`PipelineError::Synthesis`] when expansion fails; nothing is cached.
    pub async fn day_detail(
        &self,
        id: i64,
        day: u32,
        refresh: bool,
    ) -> Result<DetailRecord, PipelineError> {
        let project = self.get_analysis(id).await?;
        let entry = project
            .artifact
            .task_for(day)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(format!("day {day} of project {id}")))?;

        if !refresh {
            match self.store.cached_detail(id, day).await {
                Ok(Some(record)) => {
                    tracing::debug!(project_id = id, day, "day detail served from cache");
                    return Ok(record);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(project_id = id, day, error = %e, "day detail cache read failed");
                }
            }
        }

        let record = self.expander.expand(&project, &entry).await?;

        if let Err(e) = self.store.cache_detail(id, &record).await {
            tracing::warn!(project_id = id, day, error = %e, "day detail cache write failed");
        }
        Ok(record)
    }

    /// Month view of a project's plan.
    ///
    /// `start` defaults to the project's creation date (UTC) and `month` to
    /// the first plan month.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id.
    pub async fn calendar(
        &self,
        id: i64,
        start: Option<NaiveDate>,
        month: Option<YearMonth>,
    ) -> Result<CalendarView, PipelineError> {
        let project = self.get_analysis(id).await?;
        let start = start.unwrap_or_else(|| project.created_at.date_naive());
        let calendar = PlanCalendar::new(start, project.artifact.plan_days());
        let month = month.unwrap_or_else(|| YearMonth::of(start));

        Ok(CalendarView {
            project_id: id,
            start,
            end: calendar.end_date(),
            plan_days: calendar.plan_days(),
            months: calendar.months(),
            grid: calendar.month_grid(month, &project.artifact.roadmap),
            prev_month: calendar.has_prev(month).then(|| month.prev()),
            next_month: calendar.has_next(month).then(|| month.next()),
        })
    }

    /// The report handed to notification delivery, dated from creation.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id.
    pub async fn plan_report(&self, id: i64) -> Result<PlanReport, PipelineError> {
        let project = self.get_analysis(id).await?;
        Ok(render_plan_report(&project, project.created_at.date_naive()))
    }

    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a malformed recipient.
    /// - [`PipelineError::NotFound`] for an unknown id.
    /// - [`PipelineError::Notification`] when delivery is unavailable or fails.
    pub async fn send_plan(&self, id: i64, recipient: &str) -> Result<Delivery, PipelineError> {
        let recipient = validate_email(recipient)?;
        let project = self.get_analysis(id).await?;
        let notifier = self.notifier.as_ref().ok_or(NotifyError::NotConfigured)?;

        let report = render_plan_report(&project, project.created_at.date_naive());
        let message = notifier.send(&recipient, &report, &project).await?;
        Ok(Delivery {
            sent: true,
            message,
        })
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if the store is unreachable.
    pub async fn health(&self) -> Result<(), PipelineError> {
        self.store.health().await.map_err(PipelineError::Storage)
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
