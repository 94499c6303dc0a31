use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Query, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::debt_dto::{DebtQuery, DebtsResponse};
use meterpay_primitives::models::entities::enum_types::parse_debt_filter;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/debts",
    tag = "Debts",
    summary = "List debts by due date",
    params(DebtQuery),
    responses(
        (status = 200, description = "Debts", body = DebtsResponse),
        (status = 400, description = "Unknown filter", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn list_debts(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DebtQuery>,
) -> Result<Json<DebtsResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let filter = parse_debt_filter(query.status.as_deref())?;
    Ok(Json(QueryService::list_debts(&state, user_id, filter).await?))
}
