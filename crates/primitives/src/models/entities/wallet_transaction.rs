use crate::models::entities::enum_types::WalletEntryType;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::wallet_transactions)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_type: WalletEntryType,
    pub amount: i64,
    pub description: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn signed_amount(&self) -> i64 {
        self.entry_type.signed(self.amount)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::wallet_transactions)]
pub struct NewWalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_type: WalletEntryType,
    pub amount: i64,
    pub description: String,
    pub reference: Option<String>,
}
