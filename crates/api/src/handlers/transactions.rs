use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Query, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::transaction_dto::{StatusQuery, TransactionsResponse};
use meterpay_primitives::models::entities::enum_types::parse_status_filter;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    summary = "List transactions, newest first",
    params(StatusQuery),
    responses(
        (status = 200, description = "Transactions", body = TransactionsResponse),
        (status = 400, description = "Unknown status filter", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let status = parse_status_filter(query.status.as_deref())?;
    Ok(Json(
        QueryService::list_transactions(&state, user_id, status).await?,
    ))
}
