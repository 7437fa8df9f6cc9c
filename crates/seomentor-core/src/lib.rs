//! Domain types, request validation, configuration, and the pure calendar
//! projection shared by every SEOmentor crate.

pub mod analysis;
pub mod app_config;
pub mod calendar;
pub mod config;
pub mod report;
pub mod request;

use thiserror::Error;

pub use analysis::{
    AnalysisArtifact, Competitor, DetailRecord, PageSignals, Project, ProjectSummary, RoadmapDay,
};
pub use app_config::{AppConfig, Environment};
pub use calendar::{CalendarCell, MonthGrid, PlanCalendar, YearMonth};
pub use config::{load_app_config, load_app_config_from_env};
pub use report::{render_plan_report, PlanReport};
pub use request::{
    validate_email, AnalysisContext, AnalysisRequest, ListInput, ValidationError, MAX_LIST_ITEMS,
    MAX_PLAN_DAYS, MIN_PLAN_DAYS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
