use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use axum::http::StatusCode;
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::meter_service::MeterService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::meter_dto::{CreateMeterRequest, MeterDto};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/meters",
    request_body = CreateMeterRequest,
    tag = "Meters",
    summary = "Register a meter",
    description = "Idempotent: registering a number that already exists returns the existing \
                   meter with 200. An unowned meter is claimed by the caller. A nickname is only \
                   adopted when the meter has none.",
    responses(
        (status = 201, description = "Meter created", body = MeterDto),
        (status = 200, description = "Meter already registered", body = MeterDto),
        (status = 400, description = "Invalid meter number", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 409, description = "Meter belongs to another account", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn create_meter(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMeterRequest>,
) -> Result<(StatusCode, Json<MeterDto>), ApiError> {
    let user_id = claims.user_id()?;
    let (meter, created) = MeterService::register_meter(&state, user_id, req).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(meter)))
}
