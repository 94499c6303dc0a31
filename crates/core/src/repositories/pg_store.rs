use crate::repositories::debt_repository::DebtRepository;
use crate::repositories::meter_repository::MeterRepository;
use crate::repositories::store::{EntityStore, MeterClaim, MeterResolution, Settlement};
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::wallet_repository::WalletRepository;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::{
    Debt, DebtFilter, Meter, MeterChanges, MeterStatus, NewDebt, NewMeter, NewTransaction,
    NewUser, NewWalletTransaction, Transaction, TransactionStats, TransactionStatus, User,
    WalletTransaction,
};
use tracing::{error, info};
use uuid::Uuid;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// PostgreSQL store. Multi-row operations run inside one database transaction
/// and use conditional updates for every balance or state change.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn run_migrations(&self) -> Result<(), ApiError> {
        let mut conn = self.conn()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            error!("store.migrate: {}", e);
            ApiError::Internal(format!("Migration failed: {}", e))
        })?;

        info!(count = applied.len(), "store.migrate: pending migrations applied");
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, ApiError> {
        self.pool.get().map_err(|e| {
            error!("store: failed to acquire db connection: {}", e);
            ApiError::DatabaseConnection("Database unavailable".into())
        })
    }
}

impl EntityStore for PgStore {
    fn ping(&self) -> Result<(), ApiError> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
        Ok(())
    }

    fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let mut conn = self.conn()?;
        UserRepository::create(&mut conn, user)
    }

    fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        let mut conn = self.conn()?;
        UserRepository::find_by_id(&mut conn, user_id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let mut conn = self.conn()?;
        UserRepository::find_by_username(&mut conn, username)
    }

    fn create_meter(&self, meter: NewMeter) -> Result<Meter, ApiError> {
        let mut conn = self.conn()?;
        MeterRepository::create(&mut conn, &meter)
    }

    fn find_meter(&self, meter_id: Uuid) -> Result<Option<Meter>, ApiError> {
        let mut conn = self.conn()?;
        MeterRepository::find_by_id(&mut conn, meter_id)
    }

    fn find_meter_by_number(&self, meter_number: &str) -> Result<Option<Meter>, ApiError> {
        let mut conn = self.conn()?;
        MeterRepository::find_by_number(&mut conn, meter_number)
    }

    fn resolve_meter(&self, claim: MeterClaim) -> Result<MeterResolution, ApiError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, ApiError, _>(|conn| {
            if let Some(meter) = MeterRepository::find_by_number_for_update(conn, &claim.meter_number)? {
                return adopt(conn, meter, &claim);
            }

            let new_meter = NewMeter {
                id: Uuid::new_v4(),
                user_id: Some(claim.user_id),
                meter_number: claim.meter_number.clone(),
                nickname: claim.nickname.clone(),
                status: MeterStatus::Active,
            };

            match MeterRepository::create_if_absent(conn, &new_meter)? {
                Some(meter) => Ok(MeterResolution::Created(meter)),
                None => {
                    // a concurrent writer created it between our lookup and insert
                    let meter = MeterRepository::find_by_number_for_update(conn, &claim.meter_number)?
                        .ok_or_else(|| ApiError::Internal("meter vanished during resolve".into()))?;
                    adopt(conn, meter, &claim)
                }
            }
        })
    }

    fn update_meter(&self, meter_id: Uuid, changes: MeterChanges) -> Result<Meter, ApiError> {
        let mut conn = self.conn()?;
        MeterRepository::update(&mut conn, meter_id, &changes)?
            .ok_or_else(|| ApiError::NotFound("Meter not found".into()))
    }

    fn recent_meters(&self, user_id: Uuid, limit: i64) -> Result<Vec<Meter>, ApiError> {
        let mut conn = self.conn()?;
        MeterRepository::recent_by_user(&mut conn, user_id, limit)
    }

    fn insert_pending_transaction(&self, tx: NewTransaction) -> Result<Transaction, ApiError> {
        let pending = NewTransaction {
            status: TransactionStatus::Pending,
            ..tx
        };
        let mut conn = self.conn()?;
        TransactionRepository::create(&mut conn, &pending)
    }

    fn find_transaction(
        &self,
        user_id: Uuid,
        tx_id: Uuid,
    ) -> Result<Option<Transaction>, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::find_by_id_and_user(&mut conn, tx_id, user_id)
    }

    fn find_transaction_by_idempotency_key(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::find_by_idempotency_key(&mut conn, user_id, key)
    }

    fn list_transactions(
        &self,
        user_id: Uuid,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::list_by_user(&mut conn, user_id, status, None)
    }

    fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::list_by_user(&mut conn, user_id, None, Some(limit))
    }

    fn transaction_stats(&self, user_id: Uuid) -> Result<TransactionStats, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::stats_by_user(&mut conn, user_id)
    }

    fn settle_transaction(&self, settlement: Settlement) -> Result<Transaction, ApiError> {
        if !settlement.is_consistent() {
            return Err(ApiError::Internal("inconsistent settlement".into()));
        }

        let mut conn = self.conn()?;

        conn.transaction::<_, ApiError, _>(|conn| {
            let now = Utc::now();

            let settled = match TransactionRepository::finalize(conn, &settlement, now)? {
                Some(tx) => tx,
                None => {
                    return match TransactionRepository::find_by_id(conn, settlement.transaction_id)? {
                        Some(tx) => Err(ApiError::Conflict(format!(
                            "Transaction {} is already {}",
                            tx.id, tx.status
                        ))),
                        None => Err(ApiError::NotFound("Transaction not found".into())),
                    };
                }
            };

            if let Some(debit) = settlement.wallet_debit.as_ref() {
                UserRepository::debit(conn, settled.user_id, debit.amount)?;
                WalletRepository::add_entry(
                    conn,
                    &NewWalletTransaction {
                        id: Uuid::new_v4(),
                        user_id: settled.user_id,
                        entry_type: debit.entry_type,
                        amount: debit.amount,
                        description: debit.description.clone(),
                        reference: Some(settled.id.to_string()),
                    },
                )?;
            }

            if let Some(debt_id) = settlement.debt_id {
                if !DebtRepository::mark_paid(conn, debt_id, settled.user_id, settled.id, now)? {
                    return Err(
                        match DebtRepository::find_by_id_and_user(conn, debt_id, settled.user_id)? {
                            Some(_) => ApiError::AlreadyPaid(debt_id),
                            None => ApiError::NotFound("Debt not found".into()),
                        },
                    );
                }
            }

            MeterRepository::touch(conn, &settled.meter_number, now)?;

            Ok(settled)
        })
    }

    fn fail_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<Uuid>, ApiError> {
        let mut conn = self.conn()?;
        TransactionRepository::fail_pending_before(&mut conn, cutoff, reason)
    }

    fn create_debt(&self, debt: NewDebt) -> Result<Debt, ApiError> {
        let mut conn = self.conn()?;
        DebtRepository::create(&mut conn, &debt)
    }

    fn find_debt(&self, user_id: Uuid, debt_id: Uuid) -> Result<Option<Debt>, ApiError> {
        let mut conn = self.conn()?;
        DebtRepository::find_by_id_and_user(&mut conn, debt_id, user_id)
    }

    fn list_debts(&self, user_id: Uuid, filter: DebtFilter) -> Result<Vec<Debt>, ApiError> {
        let mut conn = self.conn()?;
        DebtRepository::list_by_user(&mut conn, user_id, filter)
    }

    fn wallet_balance(&self, user_id: Uuid) -> Result<i64, ApiError> {
        let mut conn = self.conn()?;
        UserRepository::balance(&mut conn, user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    fn ledger_sum(&self, user_id: Uuid) -> Result<i64, ApiError> {
        let mut conn = self.conn()?;
        WalletRepository::signed_sum(&mut conn, user_id)
    }

    fn apply_wallet_entry(
        &self,
        entry: NewWalletTransaction,
    ) -> Result<(WalletTransaction, i64), ApiError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, ApiError, _>(|conn| {
            let balance = if entry.entry_type.is_debit() {
                UserRepository::debit(conn, entry.user_id, entry.amount)?
            } else {
                UserRepository::credit(conn, entry.user_id, entry.amount)?
            };

            let record = WalletRepository::add_entry(conn, &entry)?;
            Ok((record, balance))
        })
    }

    fn find_wallet_entry_by_reference(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Option<WalletTransaction>, ApiError> {
        let mut conn = self.conn()?;
        WalletRepository::find_by_reference(&mut conn, user_id, reference)
    }

    fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, ApiError> {
        let mut conn = self.conn()?;
        WalletRepository::recent_by_user(&mut conn, user_id, limit)
    }
}

/// Applies the claim rules to a meter that already exists. Caller holds the row lock.
fn adopt(
    conn: &mut PgConnection,
    meter: Meter,
    claim: &MeterClaim,
) -> Result<MeterResolution, ApiError> {
    let adopt_nickname =
        meter.manageable_by(claim.user_id) && !meter.has_nickname() && claim.nickname.is_some();
    let claim_owner = meter.user_id.is_none();

    if !adopt_nickname && !claim_owner {
        return Ok(MeterResolution::Existing(meter));
    }

    let owner = meter.user_id.or(Some(claim.user_id));
    let nickname = if adopt_nickname {
        claim.nickname.as_deref()
    } else {
        meter.nickname.as_deref()
    };

    let updated = MeterRepository::assign(conn, meter.id, owner, nickname)?;
    Ok(MeterResolution::Existing(updated))
}
