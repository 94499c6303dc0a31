use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Path, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::transaction_dto::TransactionDto;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/transactions/{transaction_id}",
    tag = "Transactions",
    summary = "Get details of a specific transaction",
    description = "Only transactions belonging to the authenticated user are accessible. \
                   Use this endpoint for receipts and status polling.",
    operation_id = "getTransactionById",
    params(("transaction_id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction details retrieved successfully", body = TransactionDto),
        (status = 400, description = "Bad request – invalid transaction ID format", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized – missing or invalid authentication token", body = ApiErrorResponse),
        (status = 404, description = "Not found – no transaction exists with the provided ID", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn get_user_transaction(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionDto>, ApiError> {
    let user_id = claims.user_id()?;
    let tnx_response = QueryService::get_transaction(&state, user_id, transaction_id).await?;

    Ok(Json(tnx_response))
}
