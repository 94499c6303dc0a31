use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Path, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::meter_service::MeterService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::meter_dto::MeterDto;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/meters/{meter_id}",
    tag = "Meters",
    params(("meter_id" = Uuid, Path, description = "Meter id")),
    responses(
        (status = 200, description = "Meter details", body = MeterDto),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "No such meter on this account", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn get_meter(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(meter_id): Path<Uuid>,
) -> Result<Json<MeterDto>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(MeterService::get_meter(&state, user_id, meter_id).await?))
}
