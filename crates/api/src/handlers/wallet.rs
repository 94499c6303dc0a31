use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::wallet_dto::WalletDto;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/wallet",
    tag = "Wallet",
    summary = "Current wallet balance in cents",
    responses(
        (status = 200, description = "Balance", body = WalletDto),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn wallet_balance(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<WalletDto>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(QueryService::wallet_summary(&state, user_id).await?))
}
