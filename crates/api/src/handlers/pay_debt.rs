use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, Path, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::payment_service::PaymentService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::debt_dto::{DebtDto, DebtPaymentResponse, PayDebtRequest};
use meterpay_primitives::models::dtos::transaction_dto::TransactionDto;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/debts/{debt_id}/pay",
    request_body = PayDebtRequest,
    tag = "Debts",
    summary = "Pay a debt in full",
    description = "The debt is marked paid in the same atomic step that settles the transaction. \
                   A declined payment leaves the debt unpaid and returns the failed transaction.",
    params(("debt_id" = Uuid, Path, description = "Debt id")),
    responses(
        (status = 200, description = "Payment settled", body = DebtPaymentResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "No such debt on this account", body = ApiErrorResponse),
        (status = 409, description = "Debt already paid", body = ApiErrorResponse),
        (status = 422, description = "Wallet balance too low", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn pay_debt(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(debt_id): Path<Uuid>,
    Json(req): Json<PayDebtRequest>,
) -> Result<Json<DebtPaymentResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let (tx, debt) = PaymentService::submit_debt_payment(&state, user_id, debt_id, req).await?;

    Ok(Json(DebtPaymentResponse {
        transaction: TransactionDto::from(tx),
        debt: DebtDto::from(debt),
    }))
}
