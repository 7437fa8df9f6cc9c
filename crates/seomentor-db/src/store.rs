use async_trait::async_trait;
use seomentor_core::{AnalysisArtifact, AnalysisContext, DetailRecord, Project, ProjectSummary};

use crate::DbError;

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Storage seam for analysis projects.
///
/// Projects are insert-only: there is no update or delete. The day detail
/// cache is the only mutable state and never touches the project row.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist a new project and return its identifier. Identifiers are
    /// unique even under concurrent calls.
    async fn create(
        &self,
        context: &AnalysisContext,
        artifact: &AnalysisArtifact,
    ) -> Result<i64, DbError>;

    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] when no project has this id.
    async fn get(&self, id: i64) -> Result<Project, DbError>;

    /// Most recent first. `limit` is clamped with [`clamp_list_limit`].
    async fn list(&self, limit: Option<i64>) -> Result<Vec<ProjectSummary>, DbError>;

    async fn cached_detail(&self, project_id: i64, day: u32)
        -> Result<Option<DetailRecord>, DbError>;

    /// Insert or replace the cached detail for `record.day`.
    async fn cache_detail(&self, project_id: i64, record: &DetailRecord) -> Result<(), DbError>;

    async fn health(&self) -> Result<(), DbError>;
}

/// Missing or non-positive limits fall back to the default; large ones are capped.
#[must_use]
pub fn clamp_list_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n.min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    }
}
