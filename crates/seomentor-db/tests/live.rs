//! Live integration tests for seomentor-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/seomentor-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use seomentor_core::{
    AnalysisArtifact, AnalysisContext, AnalysisRequest, Competitor, DetailRecord, RoadmapDay,
};
use seomentor_db::{ArtifactStore, DbError, PgArtifactStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn context(url: &str, plan_days: i64) -> AnalysisContext {
    AnalysisRequest {
        url: url.to_string(),
        business_offer: "Flower delivery".to_string(),
        target_audience: "Office managers".to_string(),
        plan_days: Some(plan_days),
        ..AnalysisRequest::default()
    }
    .into_context()
    .expect("valid context")
}

fn artifact(score: u8, plan_days: u32) -> AnalysisArtifact {
    AnalysisArtifact {
        seo_score: score,
        issues: vec!["Missing meta description".to_string()],
        competitors: vec![Competitor {
            name: "Flora".to_string(),
            reason: "Ranks for \"flowers baku\"".to_string(),
            url: None,
        }],
        keyword_gaps: vec!["same day flowers".to_string()],
        roadmap: (1..=plan_days)
            .map(|day| RoadmapDay {
                day,
                task: format!("Task {day}"),
            })
            .collect(),
    }
}

fn detail(day: u32, kpi: &str) -> DetailRecord {
    DetailRecord {
        day,
        task: format!("Task {day}"),
        description: "Rewrite the title.".to_string(),
        checklist: vec!["Audit".to_string(), "Publish".to_string()],
        kpi: kpi.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_and_get_round_trip(pool: sqlx::PgPool) {
    let store = PgArtifactStore::new(pool);
    let ctx = context("example.com", 14);
    let art = artifact(61, 14);

    let id = store.create(&ctx, &art).await.expect("create");
    let first = store.get(id).await.expect("get");
    let second = store.get(id).await.expect("get again");

    assert_eq!(first, second);
    assert_eq!(first.url, "https://example.com/");
    assert_eq!(first.artifact, art);
    assert_eq!(first.context, ctx);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_missing_project_is_not_found(pool: sqlx::PgPool) {
    let store = PgArtifactStore::new(pool);
    assert!(matches!(store.get(999).await, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn ids_increase_and_list_is_most_recent_first(pool: sqlx::PgPool) {
    let store = PgArtifactStore::new(pool);
    let a = store
        .create(&context("https://a.example", 7), &artifact(10, 7))
        .await
        .unwrap();
    let b = store
        .create(&context("https://b.example", 30), &artifact(90, 30))
        .await
        .unwrap();
    assert!(b > a);

    let listed = store.list(None).await.unwrap();
    assert_eq!(listed.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(listed[0].url, "https://b.example/");
    assert_eq!(listed[0].seo_score, 90);
    assert_eq!(listed[0].plan_days, 30);

    assert_eq!(store.list(Some(1)).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_creates_allocate_distinct_ids(pool: sqlx::PgPool) {
    let store = std::sync::Arc::new(PgArtifactStore::new(pool));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = std::sync::Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .create(&context("https://example.com", 7), &artifact(50, 7))
                .await
                .unwrap()
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

// ---------------------------------------------------------------------------
// Day detail cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn detail_cache_upserts_without_touching_artifact(pool: sqlx::PgPool) {
    let store = PgArtifactStore::new(pool);
    let id = store
        .create(&context("https://example.com", 7), &artifact(61, 7))
        .await
        .unwrap();
    let before = store.get(id).await.unwrap();

    assert_eq!(store.cached_detail(id, 2).await.unwrap(), None);
    store.cache_detail(id, &detail(2, "first")).await.unwrap();
    store.cache_detail(id, &detail(2, "second")).await.unwrap();

    let cached = store.cached_detail(id, 2).await.unwrap().expect("cached");
    assert_eq!(cached.kpi, "second");
    assert_eq!(store.get(id).await.unwrap(), before);
}

#[sqlx::test(migrations = "../../migrations")]
async fn caching_for_unknown_project_fails(pool: sqlx::PgPool) {
    let store = PgArtifactStore::new(pool);
    let err = store.cache_detail(12345, &detail(1, "k")).await.unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)), "got {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_check_succeeds(pool: sqlx::PgPool) {
    PgArtifactStore::new(pool).health().await.expect("healthy");
}
