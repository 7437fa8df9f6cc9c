use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use seomentor_pipeline::Delivery;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SendPlanRequest {
    #[serde(default)]
    pub email: String,
}

pub(super) async fn send_plan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    body: Result<Json<SendPlanRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let delivery = state
        .service
        .send_plan(id, &body.email)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, delivery)))
}
