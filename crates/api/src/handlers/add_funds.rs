use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::ledger_service::LedgerService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::wallet_dto::{AddFundsRequest, AddFundsResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/wallet/add-funds",
    request_body = AddFundsRequest,
    tag = "Wallet",
    summary = "Top up the wallet",
    description = "Amounts are cents between 500 and 100000 by default. \
                   Repeating an `idempotencyKey` returns the original deposit without crediting twice.",
    responses(
        (status = 200, description = "Funds added", body = AddFundsResponse),
        (status = 400, description = "Amount out of bounds", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn add_funds(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddFundsRequest>,
) -> Result<Json<AddFundsResponse>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(LedgerService::top_up(&state, user_id, req).await?))
}
