use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Path, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::debt_dto::DebtDto;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/debts/{debt_id}",
    tag = "Debts",
    params(("debt_id" = Uuid, Path, description = "Debt id")),
    responses(
        (status = 200, description = "Debt details", body = DebtDto),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "No such debt on this account", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn get_debt(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(debt_id): Path<Uuid>,
) -> Result<Json<DebtDto>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(QueryService::get_debt(&state, user_id, debt_id).await?))
}
