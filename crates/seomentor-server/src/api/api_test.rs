use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use seomentor_db::MemoryArtifactStore;
use seomentor_pipeline::AnalysisService;
use seomentor_scraper::{ExtractError, PageFetcher};
use seomentor_synthesis::{DetailExpander, GenerationRequest, SynthesisContract, TextGenerator};
use tower::ServiceExt;

use super::*;

const PAGE: &str = "<html><head><title>Fresh Flowers</title></head>\
    <body><h1>Flowers</h1><p>Same day delivery in Baku.</p></body></html>";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeFetcher {
    status: Option<u16>,
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        match self.status {
            None => Ok(PAGE.to_string()),
            Some(status) => Err(ExtractError::UnexpectedStatus {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// `None` entries time out. The last reply repeats.
struct FakeGenerator {
    replies: Vec<Option<String>>,
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .get(index.min(self.replies.len().saturating_sub(1)))
            .cloned()
            .flatten()
            .ok_or(GenerateError::Timeout)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn analysis(plan_days: u32) -> Option<String> {
    Some(
        json!({
            "seo_score": 71,
            "issues": ["Short title", "No meta description", "Few H2s", "Images missing alt"],
            "competitors": [
                {"name": "Flora", "reason": "Same-day delivery", "url": "flora.az"},
                {"name": "Gul Evi", "reason": "Ranks for roses"},
                {"name": "Bloom", "reason": "Catalog overlap"},
                {"name": "Rose Box", "reason": "Premium boxes"},
                {"name": "Petal", "reason": "Corporate gifts"}
            ],
            "keyword_gaps": ["a", "b", "c", "d", "e", "f", "g", "h"],
            "roadmap": (1..=plan_days)
                .map(|d| json!({"day": d, "task": format!("Task {d}")}))
                .collect::<Vec<_>>()
        })
        .to_string(),
    )
}

fn detail() -> Option<String> {
    Some(
        json!({
            "description": "Rewrite the title tag.",
            "checklist": ["Audit", "Draft", "Publish", "Track"],
            "kpi": "CTR +0.5pp in 14 days"
        })
        .to_string(),
    )
}

struct TestApp {
    router: Router,
    generator: Arc<FakeGenerator>,
}

fn test_app_with(
    replies: Vec<Option<String>>,
    fetch_status: Option<u16>,
    auth: AuthState,
    rate_limit: RateLimitState,
) -> TestApp {
    let generator = Arc::new(FakeGenerator {
        replies,
        calls: AtomicUsize::new(0),
    });
    let text = Arc::clone(&generator) as Arc<dyn TextGenerator>;
    let service = AnalysisService::new(
        Arc::new(FakeFetcher {
            status: fetch_status,
        }),
        SynthesisContract::new(Arc::clone(&text)),
        DetailExpander::new(text),
        Arc::new(MemoryArtifactStore::new()),
    );
    let router = build_app(
        AppState {
            service: Arc::new(service),
        },
        auth,
        rate_limit,
    );
    TestApp { router, generator }
}

fn test_app(replies: Vec<Option<String>>) -> TestApp {
    test_app_with(
        replies,
        None,
        AuthState::disabled(),
        default_rate_limit_state(),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn create(router: &Router, plan_days: u32) -> i64 {
    let (status, json) = send(
        router,
        post_json(
            "/api/v1/analyses",
            &json!({"url": "flowers.example", "business_offer": "Flowers", "plan_days": plan_days}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["project_id"].as_i64().expect("project id")
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[test]
fn api_error_codes_map_to_statuses() {
    for (code, status) in [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("extraction_error", StatusCode::UNPROCESSABLE_ENTITY),
        ("synthesis_error", StatusCode::BAD_GATEWAY),
        ("synthesis_timeout", StatusCode::GATEWAY_TIMEOUT),
        ("notification_error", StatusCode::BAD_GATEWAY),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ] {
        let response = ApiError::new("req-1", code, "x").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[tokio::test]
async fn health_reports_ok_and_echoes_request_id() {
    let app = test_app(vec![]);
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-42");
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_and_list() {
    let app = test_app(vec![analysis(7)]);
    let id = create(&app.router, 7).await;

    let (status, json) = send(&app.router, get(&format!("/api/v1/analyses/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["url"], "https://flowers.example/");
    assert_eq!(json["data"]["artifact"]["seo_score"], 71);
    assert_eq!(json["data"]["artifact"]["roadmap"].as_array().map(Vec::len), Some(7));

    let (status, json) = send(&app.router, get("/api/v1/analyses?limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], id);
    assert_eq!(json["data"][0]["plan_days"], 7);
}

#[tokio::test]
async fn out_of_range_plan_is_validation_error_without_generation() {
    let app = test_app(vec![analysis(7)]);
    let (status, json) = send(
        &app.router,
        post_json(
            "/api/v1/analyses",
            &json!({"url": "flowers.example", "business_offer": "Flowers", "plan_days": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(app.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_validation_error() {
    let app = test_app(vec![analysis(7)]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/analyses")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn fetch_failure_is_extraction_error() {
    let app = test_app_with(
        vec![analysis(7)],
        Some(503),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    let (status, json) = send(
        &app.router,
        post_json(
            "/api/v1/analyses",
            &json!({"url": "flowers.example", "business_offer": "Flowers", "plan_days": 7}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "extraction_error");
}

#[tokio::test]
async fn synthesis_timeouts_map_to_gateway_timeout() {
    let app = test_app(vec![None]);
    let (status, json) = send(
        &app.router,
        post_json(
            "/api/v1/analyses",
            &json!({"url": "flowers.example", "business_offer": "Flowers", "plan_days": 7}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["error"]["code"], "synthesis_timeout");

    let (_, json) = send(&app.router, get("/api/v1/analyses")).await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn synthesis_violations_map_to_bad_gateway() {
    let app = test_app(vec![Some("not json".to_string())]);
    let (status, json) = send(
        &app.router,
        post_json(
            "/api/v1/analyses",
            &json!({"url": "flowers.example", "business_offer": "Flowers", "plan_days": 7}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "synthesis_error");
}

#[tokio::test]
async fn unknown_analysis_is_not_found() {
    let app = test_app(vec![]);
    let (status, json) = send(&app.router, get("/api/v1/analyses/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

// ---------------------------------------------------------------------------
// Days, calendar, delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn day_detail_round_trip_and_out_of_range() {
    let app = test_app(vec![analysis(7), detail()]);
    let id = create(&app.router, 7).await;

    let (status, json) = send(&app.router, get(&format!("/api/v1/analyses/{id}/days/2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["day"], 2);
    assert_eq!(json["data"]["task"], "Task 2");
    assert_eq!(json["data"]["kpi"], "CTR +0.5pp in 14 days");

    let calls = app.generator.calls.load(Ordering::SeqCst);
    let (status, _) = send(&app.router, get(&format!("/api/v1/analyses/{id}/days/8"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app.router, get(&format!("/api/v1/analyses/{id}/days/0"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.generator.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn calendar_renders_requested_month() {
    let app = test_app(vec![analysis(30)]);
    let id = create(&app.router, 30).await;

    let (status, json) = send(
        &app.router,
        get(&format!(
            "/api/v1/analyses/{id}/calendar?start=2024-01-20&month=2024-02"
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["grid"]["month"], "2024-02");
    assert_eq!(json["data"]["prev_month"], "2024-01");
    assert!(json["data"]["next_month"].is_null());
    let cells = json["data"]["grid"]["cells"].as_array().expect("cells");
    assert_eq!(cells.len() % 7, 0);
}

#[tokio::test]
async fn calendar_rejects_bad_query_values() {
    let app = test_app(vec![analysis(7)]);
    let id = create(&app.router, 7).await;

    for query in ["start=2024-13-01", "month=2024-13", "month=soon"] {
        let (status, json) = send(
            &app.router,
            get(&format!("/api/v1/analyses/{id}/calendar?{query}")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[tokio::test]
async fn email_validates_recipient_then_requires_notifier() {
    let app = test_app(vec![analysis(7)]);
    let id = create(&app.router, 7).await;
    let uri = format!("/api/v1/analyses/{id}/email");

    let (status, json) = send(&app.router, post_json(&uri, &json!({"email": "nope"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (status, json) = send(
        &app.router,
        post_json(&uri, &json!({"email": "owner@flowers.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "notification_error");
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_routes_require_bearer_token_when_enabled() {
    let auth = AuthState::from_keys("secret-key", false).expect("auth");
    let app = test_app_with(vec![], None, auth, default_rate_limit_state());

    let (status, json) = send(&app.router, get("/api/v1/analyses")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let request = Request::builder()
        .uri("/api/v1/analyses")
        .header("authorization", "Bearer secret-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_rejects_requests_over_the_window() {
    let app = test_app_with(
        vec![],
        None,
        AuthState::disabled(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (status, _) = send(&app.router, get("/api/v1/analyses")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app.router, get("/api/v1/analyses")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}
