use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use axum::http::StatusCode;
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::payment_service::PaymentService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::transaction_dto::{PurchaseRequest, TransactionDto};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = PurchaseRequest,
    tag = "Transactions",
    summary = "Buy a recharge token",
    description = "Records a pending transaction, authorizes the payment and settles it. \
                   A declined or timed-out payment still returns 201 with status `failed` and \
                   a `failureReason`. Repeating an `idempotencyKey` returns the original transaction.",
    responses(
        (status = 201, description = "Transaction settled", body = TransactionDto),
        (status = 400, description = "Invalid input or inactive meter", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 422, description = "Wallet balance too low", body = ApiErrorResponse),
        (status = 500, description = "Token could not be issued", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<TransactionDto>), ApiError> {
    let user_id = claims.user_id()?;
    let tx = PaymentService::submit_purchase(&state, user_id, req).await?;
    Ok((StatusCode::CREATED, Json(TransactionDto::from(tx))))
}
