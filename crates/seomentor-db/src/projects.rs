//! Postgres-backed operations for the `projects` and `project_day_details` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seomentor_core::{AnalysisArtifact, AnalysisContext, DetailRecord, Project, ProjectSummary};
use sqlx::{types::Json, PgPool};

use crate::store::{clamp_list_limit, ArtifactStore};
use crate::{health_check, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A full row from the `projects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub url: String,
    pub artifact: Json<AnalysisArtifact>,
    pub context: Json<AnalysisContext>,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            artifact: row.artifact.0,
            context: row.context.0,
            created_at: row.created_at,
        }
    }
}

/// The listing projection of a `projects` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectSummaryRow {
    pub id: i64,
    pub url: String,
    pub seo_score: i16,
    pub plan_days: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectSummaryRow> for ProjectSummary {
    type Error = DbError;

    fn try_from(row: ProjectSummaryRow) -> Result<Self, Self::Error> {
        let seo_score = u8::try_from(row.seo_score)
            .map_err(|_| DbError::OutOfRange(format!("seo_score {}", row.seo_score)))?;
        let plan_days = u32::try_from(row.plan_days)
            .map_err(|_| DbError::OutOfRange(format!("plan_days {}", row.plan_days)))?;
        Ok(Self {
            id: row.id,
            url: row.url,
            seo_score,
            plan_days,
            created_at: row.created_at,
        })
    }
}

fn day_param(day: u32) -> Result<i32, DbError> {
    i32::try_from(day).map_err(|_| DbError::OutOfRange(format!("day {day}")))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert one project in a single statement and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_project(
    pool: &PgPool,
    context: &AnalysisContext,
    artifact: &AnalysisArtifact,
) -> Result<i64, DbError> {
    let plan_days = i32::try_from(artifact.plan_days())
        .map_err(|_| DbError::OutOfRange(format!("plan_days {}", artifact.plan_days())))?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO projects (url, seo_score, plan_days, artifact, context) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(&context.url)
    .bind(i16::from(artifact.seo_score))
    .bind(plan_days)
    .bind(Json(artifact))
    .bind(Json(context))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no project has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_project(pool: &PgPool, id: i64) -> Result<Project, DbError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, url, artifact, context, created_at \
         FROM projects \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row.into())
}

/// Most recent first; ties on `created_at` fall back to id order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_projects(pool: &PgPool, limit: i64) -> Result<Vec<ProjectSummary>, DbError> {
    let rows = sqlx::query_as::<_, ProjectSummaryRow>(
        "SELECT id, url, seo_score, plan_days, created_at \
         FROM projects \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProjectSummary::try_from).collect()
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cached_detail(
    pool: &PgPool,
    project_id: i64,
    day: u32,
) -> Result<Option<DetailRecord>, DbError> {
    let record = sqlx::query_scalar::<_, Json<DetailRecord>>(
        "SELECT record FROM project_day_details WHERE project_id = $1 AND day = $2",
    )
    .bind(project_id)
    .bind(day_param(day)?)
    .fetch_optional(pool)
    .await?;

    Ok(record.map(|json| json.0))
}

/// Insert the detail for `record.day`, replacing any previous entry.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, including when
/// `project_id` does not reference a project.
pub async fn upsert_cached_detail(
    pool: &PgPool,
    project_id: i64,
    record: &DetailRecord,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO project_day_details (project_id, day, record) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (project_id, day) DO UPDATE \
         SET record = EXCLUDED.record, updated_at = NOW()",
    )
    .bind(project_id)
    .bind(day_param(record.day)?)
    .bind(Json(record))
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// [`ArtifactStore`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgArtifactStore {
    pool: PgPool,
}

impl PgArtifactStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ArtifactStore for PgArtifactStore {
    async fn create(
        &self,
        context: &AnalysisContext,
        artifact: &AnalysisArtifact,
    ) -> Result<i64, DbError> {
        let id = insert_project(&self.pool, context, artifact).await?;
        tracing::info!(project_id = id, url = %context.url, "project stored");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Project, DbError> {
        get_project(&self.pool, id).await
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<ProjectSummary>, DbError> {
        list_projects(&self.pool, clamp_list_limit(limit)).await
    }

    async fn cached_detail(
        &self,
        project_id: i64,
        day: u32,
    ) -> Result<Option<DetailRecord>, DbError> {
        get_cached_detail(&self.pool, project_id, day).await
    }

    async fn cache_detail(&self, project_id: i64, record: &DetailRecord) -> Result<(), DbError> {
        upsert_cached_detail(&self.pool, project_id, record).await
    }

    async fn health(&self) -> Result<(), DbError> {
        health_check(&self.pool).await
    }
}
