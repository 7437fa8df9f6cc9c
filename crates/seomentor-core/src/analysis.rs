use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::AnalysisContext;

/// Fixed summary of one fetched homepage, used as synthesis input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSignals {
    /// First `<title>` text, trimmed. Empty when the page has none.
    pub title: String,
    /// `<meta name="description">` content, trimmed. Empty when absent.
    pub meta_description: String,
    pub h1_count: u32,
    pub h2_count: u32,
    /// Whitespace-separated words in visible text nodes only.
    pub word_count: u32,
    /// Anchors whose resolved host equals the analysed page's host.
    pub internal_link_count: u32,
    /// `<img>` elements without a non-empty `alt` attribute.
    pub missing_alt_image_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub reason: String,
    /// Set by synthesis or by a later link resolver; absent when unknown.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapDay {
    pub day: u32,
    pub task: String,
}

/// The validated result of one analysis.
///
/// Only the synthesis contract constructs new artifacts; everything else
/// reads them back from the store. `roadmap` always holds days `1..=n` in
/// ascending order with no gaps and `seo_score` is within `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    pub seo_score: u8,
    pub issues: Vec<String>,
    pub competitors: Vec<Competitor>,
    pub keyword_gaps: Vec<String>,
    pub roadmap: Vec<RoadmapDay>,
}

impl AnalysisArtifact {
    /// Number of days in the execution plan.
    #[must_use]
    pub fn plan_days(&self) -> u32 {
        u32::try_from(self.roadmap.len()).unwrap_or(u32::MAX)
    }

    /// Roadmap entry for `day`, if the ordinal is inside the plan.
    #[must_use]
    pub fn task_for(&self, day: u32) -> Option<&RoadmapDay> {
        let index = usize::try_from(day.checked_sub(1)?).ok()?;
        self.roadmap.get(index).filter(|entry| entry.day == day)
    }
}

/// One stored analysis. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub url: String,
    pub artifact: AnalysisArtifact,
    pub context: AnalysisContext,
    pub created_at: DateTime<Utc>,
}

/// Row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub url: String,
    pub seo_score: u8,
    pub plan_days: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            url: project.url.clone(),
            seo_score: project.artifact.seo_score,
            plan_days: project.artifact.plan_days(),
            created_at: project.created_at,
        }
    }
}

/// Elaborated execution guide for a single roadmap day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub day: u32,
    pub task: String,
    pub description: String,
    pub checklist: Vec<String>,
    pub kpi: String,
}
