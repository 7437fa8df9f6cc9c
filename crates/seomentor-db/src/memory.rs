//! In-process [`ArtifactStore`] for tests and database-less runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use seomentor_core::{AnalysisArtifact, AnalysisContext, DetailRecord, Project, ProjectSummary};
use tokio::sync::RwLock;

use crate::store::{clamp_list_limit, ArtifactStore};
use crate::DbError;

#[derive(Debug, Default)]
struct State {
    /// Index `i` holds the project with id `i + 1`.
    projects: Vec<Project>,
    details: HashMap<(i64, u32), DetailRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    state: RwLock<State>,
}

impl MemoryArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.projects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn index_of(id: i64) -> Option<usize> {
    usize::try_from(id.checked_sub(1)?).ok()
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn create(
        &self,
        context: &AnalysisContext,
        artifact: &AnalysisArtifact,
    ) -> Result<i64, DbError> {
        let mut state = self.state.write().await;
        let id = i64::try_from(state.projects.len() + 1)
            .map_err(|_| DbError::OutOfRange("project id".to_string()))?;
        state.projects.push(Project {
            id,
            url: context.url.clone(),
            artifact: artifact.clone(),
            context: context.clone(),
            created_at: Utc::now(),
        });
        tracing::debug!(project_id = id, "project stored in memory");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Project, DbError> {
        let state = self.state.read().await;
        index_of(id)
            .and_then(|i| state.projects.get(i))
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<ProjectSummary>, DbError> {
        let limit = usize::try_from(clamp_list_limit(limit)).unwrap_or(usize::MAX);
        let state = self.state.read().await;
        Ok(state
            .projects
            .iter()
            .rev()
            .take(limit)
            .map(ProjectSummary::from)
            .collect())
    }

    async fn cached_detail(
        &self,
        project_id: i64,
        day: u32,
    ) -> Result<Option<DetailRecord>, DbError> {
        let state = self.state.read().await;
        Ok(state.details.get(&(project_id, day)).cloned())
    }

    async fn cache_detail(&self, project_id: i64, record: &DetailRecord) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        if index_of(project_id).and_then(|i| state.projects.get(i)).is_none() {
            return Err(DbError::NotFound);
        }
        state
            .details
            .insert((project_id, record.day), record.clone());
        Ok(())
    }

    async fn health(&self) -> Result<(), DbError> {
        Ok(())
    }
}
