use crate::app_state::AppState;
use crate::clients::{ChargeRequest, GatewayDecision};
use crate::repositories::Settlement;
use crate::services::ledger_service::LedgerService;
use crate::services::meter_service::MeterService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::debt_dto::PayDebtRequest;
use meterpay_primitives::models::dtos::transaction_dto::PurchaseRequest;
use meterpay_primitives::models::entities::debt::Debt;
use meterpay_primitives::models::entities::enum_types::{
    PaymentMethod, TransactionStatus, TransactionType, WalletEntryType,
};
use meterpay_primitives::models::entities::transaction::{NewTransaction, Transaction};
use meterpay_primitives::utility::units_for;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Outcome of asking for money, before anything is settled.
#[derive(Debug)]
enum Authorization {
    Approved,
    Declined(String),
}

/// Purchase and debt-payment workflows.
///
/// A transaction is recorded `pending` before payment is authorized and is
/// settled exactly once. Validation failures happen before anything is
/// written; payment failures are recorded on the transaction.
pub struct PaymentService;

impl PaymentService {
    pub async fn submit_purchase(
        state: &AppState,
        user_id: Uuid,
        req: PurchaseRequest,
    ) -> Result<Transaction, ApiError> {
        req.validate()?;

        let meter_number = req.meter_number.trim().to_string();
        if meter_number.is_empty() {
            return Err(ApiError::BadRequest("Meter number is required".into()));
        }

        if let Some(key) = req.idempotency_key.as_deref() {
            if let Some(existing) = state.store.find_transaction_by_idempotency_key(user_id, key)? {
                return Self::replay_purchase(existing, &meter_number, req.amount);
            }
        }

        let total = Self::total_for(state, req.amount, req.payment_method)?;

        if req.payment_method == PaymentMethod::Wallet {
            LedgerService::ensure_funds(state, user_id, req.amount)?;
        }

        let meter = MeterService::resolve_for_purchase(state, user_id, &meter_number, req.nickname)?;

        let pending = match state.store.insert_pending_transaction(NewTransaction {
            id: Uuid::new_v4(),
            user_id,
            meter_number: meter.meter_number,
            debt_id: None,
            amount: req.amount,
            total,
            status: TransactionStatus::Pending,
            payment_method: req.payment_method,
            transaction_type: TransactionType::Recharge,
            idempotency_key: req.idempotency_key.clone(),
        }) {
            Ok(tx) => tx,
            Err(ApiError::Conflict(msg)) => {
                return match Self::replayed(state, user_id, req.idempotency_key.as_deref())? {
                    Some(existing) => Self::replay_purchase(existing, &meter_number, req.amount),
                    None => Err(ApiError::Conflict(msg)),
                };
            }
            Err(e) => return Err(e),
        };

        info!(
            user_id = %user_id,
            tx_id = %pending.id,
            amount = pending.amount,
            total = pending.total,
            method = %pending.payment_method,
            "payment.purchase: pending transaction recorded"
        );

        let settled = match Self::authorize(state, &pending).await {
            Authorization::Approved => Self::settle_recharge(state, &pending)?,
            Authorization::Declined(reason) => Self::settle_failed(state, &pending, &reason)?,
        };

        Self::log_settled("payment.purchase", &settled);
        Ok(settled)
    }

    pub async fn submit_debt_payment(
        state: &AppState,
        user_id: Uuid,
        debt_id: Uuid,
        req: PayDebtRequest,
    ) -> Result<(Transaction, Debt), ApiError> {
        req.validate()?;

        if let Some(key) = req.idempotency_key.as_deref() {
            if let Some(existing) = state.store.find_transaction_by_idempotency_key(user_id, key)? {
                if existing.debt_id != Some(debt_id) {
                    return Err(ApiError::Conflict("Idempotency key already used".into()));
                }
                info!(user_id = %user_id, tx_id = %existing.id, "payment.debt: idempotent replay");
                let debt = Self::owned_debt(state, user_id, debt_id)?;
                return Ok((existing, debt));
            }
        }

        let debt = Self::owned_debt(state, user_id, debt_id)?;
        if debt.is_paid {
            return Err(ApiError::AlreadyPaid(debt.id));
        }

        let total = Self::total_for(state, debt.amount, req.payment_method)?;

        if req.payment_method == PaymentMethod::Wallet {
            LedgerService::ensure_funds(state, user_id, debt.amount)?;
        }

        let pending = match state.store.insert_pending_transaction(NewTransaction {
            id: Uuid::new_v4(),
            user_id,
            meter_number: debt.meter_number.clone(),
            debt_id: Some(debt.id),
            amount: debt.amount,
            total,
            status: TransactionStatus::Pending,
            payment_method: req.payment_method,
            transaction_type: TransactionType::DebtPayment,
            idempotency_key: req.idempotency_key.clone(),
        }) {
            Ok(tx) => tx,
            // the debt is reserved by another payment, or the key was taken concurrently
            Err(ApiError::Conflict(msg)) => {
                return match Self::replayed(state, user_id, req.idempotency_key.as_deref())? {
                    Some(existing) if existing.debt_id == Some(debt_id) => {
                        Ok((existing, Self::owned_debt(state, user_id, debt_id)?))
                    }
                    Some(_) => Err(ApiError::Conflict("Idempotency key already used".into())),
                    None => Err(ApiError::Conflict(msg)),
                };
            }
            Err(e) => return Err(e),
        };

        info!(
            user_id = %user_id,
            tx_id = %pending.id,
            debt_id = %debt.id,
            amount = pending.amount,
            method = %pending.payment_method,
            "payment.debt: pending transaction recorded"
        );

        let settled = match Self::authorize(state, &pending).await {
            Authorization::Approved => Self::settle_debt(state, &pending, &debt)?,
            Authorization::Declined(reason) => Self::settle_failed(state, &pending, &reason)?,
        };

        Self::log_settled("payment.debt", &settled);

        let debt = Self::owned_debt(state, user_id, debt_id)?;
        Ok((settled, debt))
    }

    /// Card and mobile carry the service fee; wallet payments do not.
    fn total_for(state: &AppState, amount: i64, method: PaymentMethod) -> Result<i64, ApiError> {
        if amount <= 0 {
            return Err(ApiError::BadRequest("Amount must be positive".into()));
        }

        let fee = if method.is_external() {
            state.config.billing.service_fee
        } else {
            0
        };

        amount
            .checked_add(fee)
            .ok_or_else(|| ApiError::BadRequest("Amount is too large".into()))
    }

    async fn authorize(state: &AppState, tx: &Transaction) -> Authorization {
        // wallet funds are re-checked atomically at settlement
        if !tx.payment_method.is_external() {
            return Authorization::Approved;
        }

        let charge = ChargeRequest {
            transaction_id: tx.id,
            user_id: tx.user_id,
            amount: tx.total,
            method: tx.payment_method,
        };

        let timeout = state.config.gateway.timeout;

        match tokio::time::timeout(timeout, state.gateway.authorize(&charge)).await {
            Ok(Ok(GatewayDecision::Approved { reference })) => {
                info!(tx_id = %tx.id, reference = %reference, "payment.authorize: approved");
                Authorization::Approved
            }
            Ok(Ok(GatewayDecision::Declined { reason })) => {
                info!(tx_id = %tx.id, reason = %reason, "payment.authorize: declined");
                Authorization::Declined(reason)
            }
            Ok(Err(e)) => {
                warn!(tx_id = %tx.id, "payment.authorize: gateway error: {}", e);
                Authorization::Declined("Payment processor unavailable".into())
            }
            Err(_) => {
                warn!(
                    tx_id = %tx.id,
                    timeout_ms = timeout.as_millis() as u64,
                    "payment.authorize: gateway timed out"
                );
                Authorization::Declined("Payment authorization timed out".into())
            }
        }
    }

    /// Issues a token and settles, retrying when the token is already taken.
    fn settle_recharge(state: &AppState, tx: &Transaction) -> Result<Transaction, ApiError> {
        let billing = &state.config.billing;
        let units = units_for(tx.amount, billing.unit_price);

        for attempt in 1..=billing.token_max_attempts {
            let mut settlement =
                Settlement::success(tx.id).with_token(state.tokens.issue(), units);

            if tx.payment_method == PaymentMethod::Wallet {
                settlement = settlement.with_wallet_debit(
                    WalletEntryType::Withdrawal,
                    tx.amount,
                    format!("Meter recharge {}", tx.meter_number),
                );
            }

            match state.store.settle_transaction(settlement) {
                Ok(settled) => {
                    if tx.payment_method == PaymentMethod::Wallet {
                        LedgerService::verify(state, tx.user_id)?;
                    }
                    return Ok(settled);
                }
                Err(ApiError::DuplicateToken) => {
                    warn!(tx_id = %tx.id, attempt, "payment.token: duplicate token, retrying");
                }
                Err(ApiError::InsufficientFunds { available, requested }) => {
                    warn!(tx_id = %tx.id, available, requested, "payment.purchase: funds spent concurrently");
                    return Self::settle_failed(state, tx, "Insufficient wallet balance");
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            tx_id = %tx.id,
            attempts = billing.token_max_attempts,
            "payment.token: could not issue a unique token"
        );
        Self::settle_failed(state, tx, "Token generation failed")?;

        Err(ApiError::TokenGeneration(format!(
            "No unique token after {} attempts",
            billing.token_max_attempts
        )))
    }

    fn settle_debt(state: &AppState, tx: &Transaction, debt: &Debt) -> Result<Transaction, ApiError> {
        let mut settlement = Settlement::success(tx.id).with_debt(debt.id);

        if tx.payment_method == PaymentMethod::Wallet {
            settlement = settlement.with_wallet_debit(
                WalletEntryType::Payment,
                tx.amount,
                format!("Debt payment: {}", debt.category),
            );
        }

        match state.store.settle_transaction(settlement) {
            Ok(settled) => Ok(settled),
            Err(ApiError::AlreadyPaid(id)) => {
                warn!(tx_id = %tx.id, debt_id = %id, "payment.debt: debt settled concurrently");
                Self::settle_failed(state, tx, "Debt already paid")
            }
            Err(ApiError::InsufficientFunds { available, requested }) => {
                warn!(tx_id = %tx.id, available, requested, "payment.debt: funds spent concurrently");
                Self::settle_failed(state, tx, "Insufficient wallet balance")
            }
            Err(e) => Err(e),
        }
    }

    fn settle_failed(state: &AppState, tx: &Transaction, reason: &str) -> Result<Transaction, ApiError> {
        state
            .store
            .settle_transaction(Settlement::failed(tx.id, reason))
    }

    fn owned_debt(state: &AppState, user_id: Uuid, debt_id: Uuid) -> Result<Debt, ApiError> {
        state
            .store
            .find_debt(user_id, debt_id)?
            .ok_or_else(|| ApiError::NotFound("Debt not found".into()))
    }

    fn replayed(
        state: &AppState,
        user_id: Uuid,
        key: Option<&str>,
    ) -> Result<Option<Transaction>, ApiError> {
        match key {
            Some(key) => state.store.find_transaction_by_idempotency_key(user_id, key),
            None => Ok(None),
        }
    }

    /// A key only replays the recharge it was first used for.
    fn replay_purchase(
        existing: Transaction,
        meter_number: &str,
        amount: i64,
    ) -> Result<Transaction, ApiError> {
        if existing.transaction_type != TransactionType::Recharge
            || existing.meter_number != meter_number
            || existing.amount != amount
        {
            warn!(tx_id = %existing.id, "payment.purchase: idempotency key reused for a different request");
            return Err(ApiError::Conflict("Idempotency key already used".into()));
        }

        info!(user_id = %existing.user_id, tx_id = %existing.id, "payment.purchase: idempotent replay");
        Ok(existing)
    }

    fn log_settled(event: &str, tx: &Transaction) {
        match tx.status {
            TransactionStatus::Success => info!(
                tx_id = %tx.id,
                user_id = %tx.user_id,
                amount = tx.amount,
                "{}: transaction succeeded",
                event
            ),
            _ => warn!(
                tx_id = %tx.id,
                user_id = %tx.user_id,
                reason = tx.failure_reason.as_deref().unwrap_or_default(),
                "{}: transaction failed",
                event
            ),
        }
    }
}
