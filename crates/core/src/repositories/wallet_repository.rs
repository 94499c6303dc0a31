use crate::repositories::violated_constraint;
use diesel::prelude::*;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::enum_types::WalletEntryType;
use meterpay_primitives::models::entities::wallet_transaction::{
    NewWalletTransaction, WalletTransaction,
};
use meterpay_primitives::schema::wallet_transactions;
use uuid::Uuid;

pub struct WalletRepository;

impl WalletRepository {
    pub fn add_entry(
        conn: &mut PgConnection,
        entry: &NewWalletTransaction,
    ) -> Result<WalletTransaction, ApiError> {
        diesel::insert_into(wallet_transactions::table)
            .values(entry)
            .get_result::<WalletTransaction>(conn)
            .map_err(|e| match violated_constraint(&e) {
                Some("wallet_transactions_user_reference_key") => {
                    ApiError::Conflict("Wallet reference already used".into())
                }
                _ => ApiError::DatabaseConnection(e.to_string()),
            })
    }

    pub fn find_by_reference(
        conn: &mut PgConnection,
        owner: Uuid,
        reference: &str,
    ) -> Result<Option<WalletTransaction>, ApiError> {
        wallet_transactions::table
            .filter(wallet_transactions::user_id.eq(owner))
            .filter(wallet_transactions::reference.eq(reference))
            .first::<WalletTransaction>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn recent_by_user(
        conn: &mut PgConnection,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, ApiError> {
        wallet_transactions::table
            .filter(wallet_transactions::user_id.eq(owner))
            .order((
                wallet_transactions::created_at.desc(),
                wallet_transactions::id.desc(),
            ))
            .limit(limit)
            .load::<WalletTransaction>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn signed_sum(conn: &mut PgConnection, owner: Uuid) -> Result<i64, ApiError> {
        let entries = wallet_transactions::table
            .filter(wallet_transactions::user_id.eq(owner))
            .select((wallet_transactions::entry_type, wallet_transactions::amount))
            .load::<(WalletEntryType, i64)>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|(entry_type, amount)| entry_type.signed(amount))
            .sum())
    }
}
