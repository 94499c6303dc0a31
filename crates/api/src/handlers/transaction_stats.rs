use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::transaction_dto::TransactionStatsDto;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/transactions/stats",
    tag = "Transactions",
    summary = "Spending over successful transactions",
    description = "`totalSpent` sums the purchased amounts (fees excluded) of successful transactions.",
    responses(
        (status = 200, description = "Aggregates", body = TransactionStatsDto),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn transaction_stats(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<TransactionStatsDto>, ApiError> {
    let user_id = claims.user_id()?;
    Ok(Json(QueryService::transaction_stats(&state, user_id).await?))
}
