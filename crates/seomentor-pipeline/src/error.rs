use seomentor_core::ValidationError;
use seomentor_db::DbError;
use seomentor_scraper::ExtractError;
use seomentor_synthesis::SynthesisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery is not configured")]
    NotConfigured,

    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint returned HTTP {status}")]
    Rejected { status: u16 },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[source] DbError),

    #[error("notification failed: {0}")]
    Notification(#[from] NotifyError),
}

impl PipelineError {
    pub(crate) fn from_store(err: DbError, what: impl Into<String>) -> Self {
        match err {
            DbError::NotFound => Self::NotFound(what.into()),
            other => Self::Storage(other),
        }
    }
}
