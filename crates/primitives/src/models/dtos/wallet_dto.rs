use crate::models::entities::enum_types::WalletEntryType;
use crate::models::entities::wallet_transaction::WalletTransaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletDto {
    pub balance: i64, // cents
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFundsRequest {
    /// Cents. Bounds are enforced against the configured top-up limits.
    #[schema(example = 5000)]
    pub amount: i64,

    #[validate(length(min = 8, max = 128))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransactionDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub entry_type: WalletEntryType,
    pub amount: i64, // cents
    pub description: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WalletTransaction> for WalletTransactionDto {
    fn from(entry: WalletTransaction) -> Self {
        Self {
            id: entry.id,
            entry_type: entry.entry_type,
            amount: entry.amount,
            description: entry.description,
            reference: entry.reference,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddFundsResponse {
    pub balance: i64,
    pub transaction: WalletTransactionDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletTransactionsResponse {
    pub transactions: Vec<WalletTransactionDto>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}
