use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::meter_dto::MetersResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/meters/recent",
    tag = "Meters",
    summary = "Five most recently active meters",
    responses(
        (status = 200, description = "Meters ordered by last activity", body = MetersResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn recent_meters(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MetersResponse>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(QueryService::recent_meters(&state, user_id).await?))
}
