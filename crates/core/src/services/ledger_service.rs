use crate::app_state::AppState;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::wallet_dto::{AddFundsRequest, AddFundsResponse, WalletTransactionDto};
use meterpay_primitives::models::entities::enum_types::WalletEntryType;
use meterpay_primitives::models::entities::transaction::TransactionStats;
use meterpay_primitives::models::entities::wallet_transaction::{
    NewWalletTransaction, WalletTransaction,
};
use meterpay_primitives::utility::format_cents;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

/// Wallet balances and spending aggregates.
pub struct LedgerService;

impl LedgerService {
    /// Signed sum of the user's wallet entries.
    pub fn current_balance(state: &AppState, user_id: Uuid) -> Result<i64, ApiError> {
        state.store.ledger_sum(user_id)
    }

    pub fn sufficient_funds(state: &AppState, user_id: Uuid, amount: i64) -> Result<bool, ApiError> {
        Ok(state.store.wallet_balance(user_id)? >= amount)
    }

    pub fn ensure_funds(state: &AppState, user_id: Uuid, amount: i64) -> Result<(), ApiError> {
        if Self::sufficient_funds(state, user_id, amount)? {
            return Ok(());
        }

        let available = state.store.wallet_balance(user_id)?;
        info!(
            user_id = %user_id,
            available,
            requested = amount,
            "ledger.funds: insufficient wallet balance"
        );
        Err(ApiError::InsufficientFunds {
            available,
            requested: amount,
        })
    }

    /// Appends an entry and moves the balance atomically. Returns the new balance.
    pub fn apply_entry(
        state: &AppState,
        user_id: Uuid,
        entry_type: WalletEntryType,
        amount: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<(WalletTransaction, i64), ApiError> {
        if amount <= 0 {
            return Err(ApiError::BadRequest("Amount must be positive".into()));
        }

        state.store.apply_wallet_entry(NewWalletTransaction {
            id: Uuid::new_v4(),
            user_id,
            entry_type,
            amount,
            description: description.to_string(),
            reference,
        })
    }

    /// Checks the cached balance against the entries. Drift is logged, not repaired.
    pub fn verify(state: &AppState, user_id: Uuid) -> Result<bool, ApiError> {
        let cached = state.store.wallet_balance(user_id)?;
        let recomputed = Self::current_balance(state, user_id)?;

        if cached != recomputed {
            error!(
                user_id = %user_id,
                cached,
                recomputed,
                "ledger.verify: wallet balance drifted from its entries"
            );
            return Ok(false);
        }
        Ok(true)
    }

    pub fn stats(state: &AppState, user_id: Uuid) -> Result<TransactionStats, ApiError> {
        state.store.transaction_stats(user_id)
    }

    pub async fn top_up(
        state: &AppState,
        user_id: Uuid,
        req: AddFundsRequest,
    ) -> Result<AddFundsResponse, ApiError> {
        req.validate()?;

        let billing = &state.config.billing;
        if req.amount < billing.min_top_up || req.amount > billing.max_top_up {
            return Err(ApiError::BadRequest(format!(
                "Amount must be between {} and {}",
                format_cents(billing.min_top_up),
                format_cents(billing.max_top_up)
            )));
        }

        if let Some(key) = req.idempotency_key.as_deref() {
            if let Some(existing) = Self::replay(state, user_id, key)? {
                return Ok(existing);
            }
        }

        let applied = Self::apply_entry(
            state,
            user_id,
            WalletEntryType::Deposit,
            req.amount,
            "Account top-up",
            req.idempotency_key.clone(),
        );

        let (entry, balance) = match (applied, req.idempotency_key.as_deref()) {
            (Ok(applied), _) => applied,
            // lost a race against a request carrying the same key
            (Err(ApiError::Conflict(_)), Some(key)) => {
                return Self::replay(state, user_id, key)?
                    .ok_or_else(|| ApiError::Conflict("Idempotency key already used".into()));
            }
            (Err(e), _) => return Err(e),
        };

        info!(
            user_id = %user_id,
            amount = req.amount,
            balance,
            "wallet.top_up: funds added"
        );
        Self::verify(state, user_id)?;

        Ok(AddFundsResponse {
            balance,
            transaction: WalletTransactionDto::from(entry),
        })
    }

    fn replay(
        state: &AppState,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<AddFundsResponse>, ApiError> {
        let Some(entry) = state.store.find_wallet_entry_by_reference(user_id, key)? else {
            return Ok(None);
        };

        if entry.entry_type != WalletEntryType::Deposit {
            return Err(ApiError::Conflict("Idempotency key already used".into()));
        }

        info!(user_id = %user_id, entry_id = %entry.id, "wallet.top_up: idempotent replay");

        Ok(Some(AddFundsResponse {
            balance: state.store.wallet_balance(user_id)?,
            transaction: WalletTransactionDto::from(entry),
        }))
    }
}
