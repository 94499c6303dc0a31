use crate::models::entities::enum_types::{PaymentMethod, TransactionStatus, TransactionType};
use crate::models::entities::transaction::{Transaction, TransactionStats};
use crate::utility::{format_cents, validate_meter_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[schema(example = "12345678901")]
    #[validate(custom(function = "validate_meter_number"))]
    pub meter_number: String,

    /// Cents.
    #[schema(example = 2000)]
    #[validate(range(min = 1, max = 10_000_000))]
    pub amount: i64,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[validate(length(min = 1, max = 64))]
    pub nickname: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    pub meter_number: String,
    pub debt_id: Option<Uuid>,
    pub amount: i64, // cents
    pub total: i64,  // cents, amount + fee
    pub fee: i64,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub transaction_type: TransactionType,
    pub token: Option<String>,
    /// kWh with two fraction digits.
    #[schema(example = "44.44")]
    pub units: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        Self {
            fee: tx.fee(),
            id: tx.id,
            meter_number: tx.meter_number,
            debt_id: tx.debt_id,
            amount: tx.amount,
            total: tx.total,
            status: tx.status,
            payment_method: tx.payment_method,
            transaction_type: tx.transaction_type,
            token: tx.token,
            units: tx.units.map(format_cents),
            failure_reason: tx.failure_reason,
            created_at: tx.created_at,
            settled_at: tx.settled_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatsDto {
    pub total_spent: i64, // cents
    pub transaction_count: i64,
}

impl From<TransactionStats> for TransactionStatsDto {
    fn from(stats: TransactionStats) -> Self {
        Self {
            total_spent: stats.total_spent,
            transaction_count: stats.transaction_count,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// `pending`, `success`, `failed` or `all`.
    pub status: Option<String>,
}
