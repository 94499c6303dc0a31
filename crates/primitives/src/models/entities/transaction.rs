use crate::models::entities::enum_types::{PaymentMethod, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::transactions)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meter_number: String,
    pub debt_id: Option<Uuid>,

    pub amount: i64,
    pub total: i64,

    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub transaction_type: TransactionType,

    pub token: Option<String>,
    /// Hundredths of a kWh.
    pub units: Option<i64>,

    pub idempotency_key: Option<String>,
    pub failure_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn fee(&self) -> i64 {
        self.total - self.amount
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meter_number: String,
    pub debt_id: Option<Uuid>,
    pub amount: i64,
    pub total: i64,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub transaction_type: TransactionType,
    pub idempotency_key: Option<String>,
}

/// Aggregate over a user's successful transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub total_spent: i64,
    pub transaction_count: i64,
}
