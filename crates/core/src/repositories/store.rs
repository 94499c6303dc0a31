use chrono::{DateTime, Utc};
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::entities::{
    Debt, DebtFilter, Meter, MeterChanges, NewDebt, NewMeter, NewTransaction, NewUser,
    NewWalletTransaction, Transaction, TransactionStats, TransactionStatus, User,
    WalletEntryType, WalletTransaction,
};
use uuid::Uuid;

/// Request to resolve a meter number for a user, creating it when unknown.
#[derive(Debug, Clone)]
pub struct MeterClaim {
    pub user_id: Uuid,
    pub meter_number: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone)]
pub enum MeterResolution {
    Created(Meter),
    Existing(Meter),
}

impl MeterResolution {
    pub fn was_created(&self) -> bool {
        matches!(self, MeterResolution::Created(_))
    }

    pub fn into_meter(self) -> Meter {
        match self {
            MeterResolution::Created(meter) | MeterResolution::Existing(meter) => meter,
        }
    }
}

/// Conditional wallet debit applied as part of a settlement.
#[derive(Debug, Clone)]
pub struct WalletDebit {
    pub entry_type: WalletEntryType,
    pub amount: i64,
    pub description: String,
}

/// Everything that happens when a pending transaction reaches a terminal state.
///
/// A store applies a settlement as one atomic unit: the conditional
/// `pending -> terminal` transition, the optional wallet debit, the optional
/// debt settlement and the meter activity touch either all commit or none do.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    pub token: Option<String>,
    pub units: Option<i64>,
    pub failure_reason: Option<String>,
    pub wallet_debit: Option<WalletDebit>,
    pub debt_id: Option<Uuid>,
}

impl Settlement {
    pub fn success(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            status: TransactionStatus::Success,
            token: None,
            units: None,
            failure_reason: None,
            wallet_debit: None,
            debt_id: None,
        }
    }

    pub fn failed(transaction_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            failure_reason: Some(reason.into()),
            status: TransactionStatus::Failed,
            ..Self::success(transaction_id)
        }
    }

    pub fn with_token(mut self, token: String, units: i64) -> Self {
        self.token = Some(token);
        self.units = Some(units);
        self
    }

    pub fn with_wallet_debit(
        mut self,
        entry_type: WalletEntryType,
        amount: i64,
        description: impl Into<String>,
    ) -> Self {
        self.wallet_debit = Some(WalletDebit {
            entry_type,
            amount,
            description: description.into(),
        });
        self
    }

    pub fn with_debt(mut self, debt_id: Uuid) -> Self {
        self.debt_id = Some(debt_id);
        self
    }

    /// Failed settlements never carry side effects.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            TransactionStatus::Success => self.failure_reason.is_none(),
            TransactionStatus::Failed => {
                self.failure_reason.is_some()
                    && self.token.is_none()
                    && self.wallet_debit.is_none()
                    && self.debt_id.is_none()
            }
            TransactionStatus::Pending => false,
        }
    }
}

/// Durable records of the ledger.
///
/// Every method is atomic on its own. Lookups scoped by `user_id` return
/// `None` for records owned by somebody else.
pub trait EntityStore: Send + Sync {
    fn ping(&self) -> Result<(), ApiError>;

    fn create_user(&self, user: NewUser) -> Result<User, ApiError>;
    fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Inserts a meter as given. Fails with `Conflict` when the number is taken.
    fn create_meter(&self, meter: NewMeter) -> Result<Meter, ApiError>;
    fn find_meter(&self, meter_id: Uuid) -> Result<Option<Meter>, ApiError>;
    fn find_meter_by_number(&self, meter_number: &str) -> Result<Option<Meter>, ApiError>;
    /// Idempotent get-or-create. Unowned meters are claimed by the caller and a
    /// nickname is adopted only when the meter has none.
    fn resolve_meter(&self, claim: MeterClaim) -> Result<MeterResolution, ApiError>;
    fn update_meter(&self, meter_id: Uuid, changes: MeterChanges) -> Result<Meter, ApiError>;
    fn recent_meters(&self, user_id: Uuid, limit: i64) -> Result<Vec<Meter>, ApiError>;

    /// Fails with `Conflict` when the user already used the idempotency key.
    fn insert_pending_transaction(&self, tx: NewTransaction) -> Result<Transaction, ApiError>;
    fn find_transaction(&self, user_id: Uuid, tx_id: Uuid)
        -> Result<Option<Transaction>, ApiError>;
    fn find_transaction_by_idempotency_key(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<Transaction>, ApiError>;
    fn list_transactions(
        &self,
        user_id: Uuid,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>, ApiError>;
    fn recent_transactions(&self, user_id: Uuid, limit: i64)
        -> Result<Vec<Transaction>, ApiError>;
    fn transaction_stats(&self, user_id: Uuid) -> Result<TransactionStats, ApiError>;
    fn settle_transaction(&self, settlement: Settlement) -> Result<Transaction, ApiError>;
    /// Fails every transaction still pending that was created before `cutoff`.
    fn fail_stale_pending(&self, cutoff: DateTime<Utc>, reason: &str)
        -> Result<Vec<Uuid>, ApiError>;

    fn create_debt(&self, debt: NewDebt) -> Result<Debt, ApiError>;
    fn find_debt(&self, user_id: Uuid, debt_id: Uuid) -> Result<Option<Debt>, ApiError>;
    fn list_debts(&self, user_id: Uuid, filter: DebtFilter) -> Result<Vec<Debt>, ApiError>;

    /// Cached balance held on the user record.
    fn wallet_balance(&self, user_id: Uuid) -> Result<i64, ApiError>;
    /// Balance recomputed from the wallet entries.
    fn ledger_sum(&self, user_id: Uuid) -> Result<i64, ApiError>;
    /// Appends an entry and moves the cached balance by its signed amount.
    /// Debits fail with `InsufficientFunds` instead of going negative.
    fn apply_wallet_entry(
        &self,
        entry: NewWalletTransaction,
    ) -> Result<(WalletTransaction, i64), ApiError>;
    fn find_wallet_entry_by_reference(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Option<WalletTransaction>, ApiError>;
    fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, ApiError>;
}
