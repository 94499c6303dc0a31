use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::transaction_dto::TransactionsResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/transactions/recent",
    tag = "Transactions",
    summary = "Five most recent transactions",
    responses(
        (status = 200, description = "Transactions", body = TransactionsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn recent_transactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(QueryService::recent_transactions(&state, user_id).await?))
}
