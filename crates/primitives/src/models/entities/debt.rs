use crate::models::entities::enum_types::DebtCategory;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::debts)]
pub struct Debt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meter_number: String,
    pub amount: i64,
    pub category: DebtCategory,
    pub due_date: DateTime<Utc>,
    pub description: Option<String>,
    pub is_paid: bool,
    pub settled_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::debts)]
pub struct NewDebt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meter_number: String,
    pub amount: i64,
    pub category: DebtCategory,
    pub due_date: DateTime<Utc>,
    pub description: Option<String>,
}
