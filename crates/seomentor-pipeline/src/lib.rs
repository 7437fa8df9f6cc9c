//! The SEOmentor analysis pipeline: create, look up, expand, and deliver.

pub mod error;
pub mod notify;
pub mod service;

pub use error::{NotifyError, PipelineError};
pub use notify::{PlanNotifier, WebhookNotifier};
pub use service::{AnalysisService, CalendarView, Delivery};
