use crate::models::dtos::transaction_dto::TransactionDto;
use crate::models::entities::debt::Debt;
use crate::models::entities::enum_types::{DebtCategory, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtDto {
    pub id: Uuid,
    pub meter_number: String,
    pub amount: i64, // cents
    pub category: DebtCategory,
    pub due_date: DateTime<Utc>,
    pub description: Option<String>,
    pub is_paid: bool,
    pub settled_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Debt> for DebtDto {
    fn from(debt: Debt) -> Self {
        Self {
            id: debt.id,
            meter_number: debt.meter_number,
            amount: debt.amount,
            category: debt.category,
            due_date: debt.due_date,
            description: debt.description,
            is_paid: debt.is_paid,
            settled_by: debt.settled_by,
            paid_at: debt.paid_at,
            created_at: debt.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebtsResponse {
    pub debts: Vec<DebtDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayDebtRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[validate(length(min = 8, max = 128))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebtPaymentResponse {
    pub transaction: TransactionDto,
    pub debt: DebtDto,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DebtQuery {
    /// `pending`, `paid` or `all`.
    pub status: Option<String>,
}
