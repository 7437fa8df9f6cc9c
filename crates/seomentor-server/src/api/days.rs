use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use seomentor_core::DetailRecord;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct DayQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub(super) async fn get_day_detail(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, day)): Path<(i64, u32)>,
    Query(query): Query<DayQuery>,
) -> Result<Json<ApiResponse<DetailRecord>>, ApiError> {
    let record = state
        .service
        .day_detail(id, day, query.refresh)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, record)))
}
