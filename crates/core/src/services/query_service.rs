use crate::app_state::AppState;
use crate::services::ledger_service::LedgerService;
use meterpay_primitives::error::{ApiError, AuthError};
use meterpay_primitives::models::dtos::auth_dto::UserProfileDto;
use meterpay_primitives::models::dtos::debt_dto::{DebtDto, DebtsResponse};
use meterpay_primitives::models::dtos::meter_dto::{MeterDto, MetersResponse};
use meterpay_primitives::models::dtos::transaction_dto::{
    TransactionDto, TransactionStatsDto, TransactionsResponse,
};
use meterpay_primitives::models::dtos::wallet_dto::{
    WalletDto, WalletTransactionDto, WalletTransactionsResponse,
};
use meterpay_primitives::models::entities::enum_types::{DebtFilter, TransactionStatus};
use tracing::error;
use uuid::Uuid;

pub const RECENT_LIMIT: i64 = 5;
pub const WALLET_HISTORY_DEFAULT: i64 = 20;
pub const WALLET_HISTORY_MAX: i64 = 100;

/// Read-side projections. Nothing here writes.
pub struct QueryService;

impl QueryService {
    pub async fn recent_meters(state: &AppState, user_id: Uuid) -> Result<MetersResponse, ApiError> {
        let meters = state.store.recent_meters(user_id, RECENT_LIMIT)?;
        Ok(MetersResponse {
            meters: meters.into_iter().map(MeterDto::from).collect(),
        })
    }

    pub async fn recent_transactions(
        state: &AppState,
        user_id: Uuid,
    ) -> Result<TransactionsResponse, ApiError> {
        let txs = state.store.recent_transactions(user_id, RECENT_LIMIT)?;
        Ok(TransactionsResponse {
            transactions: txs.into_iter().map(TransactionDto::from).collect(),
        })
    }

    pub async fn list_transactions(
        state: &AppState,
        user_id: Uuid,
        status: Option<TransactionStatus>,
    ) -> Result<TransactionsResponse, ApiError> {
        let txs = state.store.list_transactions(user_id, status)?;
        Ok(TransactionsResponse {
            transactions: txs.into_iter().map(TransactionDto::from).collect(),
        })
    }

    pub async fn get_transaction(
        state: &AppState,
        user_id: Uuid,
        tx_id: Uuid,
    ) -> Result<TransactionDto, ApiError> {
        state
            .store
            .find_transaction(user_id, tx_id)?
            .map(TransactionDto::from)
            .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))
    }

    pub async fn transaction_stats(
        state: &AppState,
        user_id: Uuid,
    ) -> Result<TransactionStatsDto, ApiError> {
        LedgerService::stats(state, user_id).map(TransactionStatsDto::from)
    }

    pub async fn list_debts(
        state: &AppState,
        user_id: Uuid,
        filter: DebtFilter,
    ) -> Result<DebtsResponse, ApiError> {
        let debts = state.store.list_debts(user_id, filter)?;
        Ok(DebtsResponse {
            debts: debts.into_iter().map(DebtDto::from).collect(),
        })
    }

    pub async fn get_debt(state: &AppState, user_id: Uuid, debt_id: Uuid) -> Result<DebtDto, ApiError> {
        state
            .store
            .find_debt(user_id, debt_id)?
            .map(DebtDto::from)
            .ok_or_else(|| ApiError::NotFound("Debt not found".into()))
    }

    /// Newest first. `limit` defaults to 20 and is capped at 100.
    pub async fn list_wallet_transactions(
        state: &AppState,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<WalletTransactionsResponse, ApiError> {
        let limit = limit
            .unwrap_or(WALLET_HISTORY_DEFAULT)
            .clamp(1, WALLET_HISTORY_MAX);

        let entries = state.store.list_wallet_transactions(user_id, limit)?;
        Ok(WalletTransactionsResponse {
            transactions: entries.into_iter().map(WalletTransactionDto::from).collect(),
        })
    }

    pub async fn wallet_summary(state: &AppState, user_id: Uuid) -> Result<WalletDto, ApiError> {
        Ok(WalletDto {
            balance: state.store.wallet_balance(user_id)?,
        })
    }

    pub async fn user_profile(state: &AppState, user_id: Uuid) -> Result<UserProfileDto, ApiError> {
        state
            .store
            .find_user(user_id)?
            .map(UserProfileDto::from)
            .ok_or_else(|| {
                error!(user_id = %user_id, "user.profile: token subject has no account");
                ApiError::Auth(AuthError::InvalidToken("User does not exist".into()))
            })
    }
}
