use crate::repositories::store::Settlement;
use crate::repositories::violated_constraint;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::enum_types::TransactionStatus;
use meterpay_primitives::models::entities::transaction::{
    NewTransaction, Transaction, TransactionStats,
};
use meterpay_primitives::schema::transactions;
use uuid::Uuid;

pub struct TransactionRepository;

impl TransactionRepository {
    pub fn create(conn: &mut PgConnection, new_tx: &NewTransaction) -> Result<Transaction, ApiError> {
        diesel::insert_into(transactions::table)
            .values(new_tx)
            .get_result::<Transaction>(conn)
            .map_err(|e| match violated_constraint(&e) {
                Some("transactions_user_idempotency_key") => {
                    ApiError::Conflict("Idempotency key already used".into())
                }
                Some("transactions_debt_in_flight") => {
                    ApiError::Conflict("Debt payment already in progress".into())
                }
                _ => ApiError::DatabaseConnection(e.to_string()),
            })
    }

    pub fn find_by_id(conn: &mut PgConnection, tx_id: Uuid) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .find(tx_id)
            .first::<Transaction>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_id_and_user(
        conn: &mut PgConnection,
        tx_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::id.eq(tx_id))
            .filter(transactions::user_id.eq(owner))
            .first::<Transaction>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn find_by_idempotency_key(
        conn: &mut PgConnection,
        owner: Uuid,
        key: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::user_id.eq(owner))
            .filter(transactions::idempotency_key.eq(key))
            .first::<Transaction>(conn)
            .optional()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn list_by_user(
        conn: &mut PgConnection,
        owner: Uuid,
        status: Option<TransactionStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut query = transactions::table
            .filter(transactions::user_id.eq(owner))
            .order((transactions::created_at.desc(), transactions::id.desc()))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(transactions::status.eq(status));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .load::<Transaction>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }

    pub fn stats_by_user(conn: &mut PgConnection, owner: Uuid) -> Result<TransactionStats, ApiError> {
        let (total_spent, transaction_count) = transactions::table
            .filter(transactions::user_id.eq(owner))
            .filter(transactions::status.eq(TransactionStatus::Success))
            .select(sql::<(BigInt, BigInt)>(
                "COALESCE(SUM(amount), 0)::BIGINT, COUNT(*)",
            ))
            .first::<(i64, i64)>(conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        Ok(TransactionStats {
            total_spent,
            transaction_count,
        })
    }

    /// Conditional `pending -> terminal` transition. `None` means the
    /// transaction was no longer pending.
    pub fn finalize(
        conn: &mut PgConnection,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, ApiError> {
        diesel::update(
            transactions::table
                .filter(transactions::id.eq(settlement.transaction_id))
                .filter(transactions::status.eq(TransactionStatus::Pending)),
        )
        .set((
            transactions::status.eq(settlement.status),
            transactions::token.eq(settlement.token.as_deref()),
            transactions::units.eq(settlement.units),
            transactions::failure_reason.eq(settlement.failure_reason.as_deref()),
            transactions::settled_at.eq(Some(at)),
        ))
        .get_result::<Transaction>(conn)
        .optional()
        .map_err(|e| match violated_constraint(&e) {
            Some("transactions_token_key") => ApiError::DuplicateToken,
            _ => ApiError::DatabaseConnection(e.to_string()),
        })
    }

    pub fn fail_pending_before(
        conn: &mut PgConnection,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<Uuid>, ApiError> {
        diesel::update(
            transactions::table
                .filter(transactions::status.eq(TransactionStatus::Pending))
                .filter(transactions::created_at.lt(cutoff)),
        )
        .set((
            transactions::status.eq(TransactionStatus::Failed),
            transactions::failure_reason.eq(reason),
            transactions::settled_at.eq(Some(Utc::now())),
        ))
        .returning(transactions::id)
        .get_results::<Uuid>(conn)
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))
    }
}
