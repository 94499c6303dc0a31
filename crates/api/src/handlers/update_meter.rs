use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Path, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::meter_service::MeterService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::meter_dto::{MeterDto, UpdateMeterRequest};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    patch,
    path = "/api/meters/{meter_id}",
    request_body = UpdateMeterRequest,
    tag = "Meters",
    summary = "Rename or (de)activate a meter",
    params(("meter_id" = Uuid, Path, description = "Meter id")),
    responses(
        (status = 200, description = "Meter updated", body = MeterDto),
        (status = 400, description = "Nothing to update or invalid input", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "No such meter on this account", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn update_meter(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(meter_id): Path<Uuid>,
    Json(req): Json<UpdateMeterRequest>,
) -> Result<Json<MeterDto>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(
        MeterService::update_meter(&state, user_id, meter_id, req).await?,
    ))
}
