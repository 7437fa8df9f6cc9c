use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use seomentor_core::YearMonth;
use seomentor_pipeline::CalendarView;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CalendarQuery {
    pub start: Option<String>,
    pub month: Option<String>,
}

fn parse_start(req_id: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                ApiError::new(
                    req_id,
                    "validation_error",
                    format!("start must be YYYY-MM-DD, got '{s}'"),
                )
            })
        })
        .transpose()
}

fn parse_month(req_id: &str, raw: Option<&str>) -> Result<Option<YearMonth>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<YearMonth>()
                .map_err(|reason| ApiError::new(req_id, "validation_error", reason))
        })
        .transpose()
}

pub(super) async fn get_calendar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<CalendarView>>, ApiError> {
    let start = parse_start(&req_id.0, query.start.as_deref())?;
    let month = parse_month(&req_id.0, query.month.as_deref())?;

    let view = state
        .service
        .calendar(id, start, month)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, view)))
}
