use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Query, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::wallet_dto::{LimitQuery, WalletTransactionsResponse};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/wallet/transactions",
    tag = "Wallet",
    summary = "Wallet entries, newest first",
    params(LimitQuery),
    responses(
        (status = 200, description = "Entries (default 20, at most 100)", body = WalletTransactionsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn wallet_transactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<WalletTransactionsResponse>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(
        QueryService::list_wallet_transactions(&state, user_id, query.limit).await?,
    ))
}
