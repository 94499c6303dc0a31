use crate::repositories::store::{EntityStore, MeterClaim, MeterResolution, Settlement};
use chrono::{DateTime, Duration, Utc};
use meterpay_primitives::error::{ApiError, AuthError};
use meterpay_primitives::models::entities::{
    Debt, DebtFilter, Meter, MeterChanges, MeterStatus, NewDebt, NewMeter, NewTransaction,
    NewUser, NewWalletTransaction, Transaction, TransactionStats, TransactionStatus, User,
    WalletTransaction,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    meters: HashMap<Uuid, Meter>,
    transactions: HashMap<Uuid, Transaction>,
    debts: HashMap<Uuid, Debt>,
    wallet: Vec<WalletTransaction>,
    tokens: HashSet<String>,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so "most recent" ordering never ties.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn meter_by_number(&self, meter_number: &str) -> Option<&Meter> {
        self.meters
            .values()
            .find(|m| m.meter_number == meter_number)
    }

    fn touch_meter(&mut self, meter_number: &str, at: DateTime<Utc>) {
        if let Some(meter) = self
            .meters
            .values_mut()
            .find(|m| m.meter_number == meter_number)
        {
            meter.updated_at = at;
        }
    }

    fn balance_of(&self, user_id: Uuid) -> Result<i64, ApiError> {
        self.users
            .get(&user_id)
            .map(|u| u.wallet_balance)
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    fn reference_taken(&self, user_id: Uuid, reference: &str) -> bool {
        self.wallet
            .iter()
            .any(|e| e.user_id == user_id && e.reference.as_deref() == Some(reference))
    }

    /// Appends a wallet entry whose preconditions were already checked.
    fn push_wallet_entry(
        &mut self,
        entry: NewWalletTransaction,
        at: DateTime<Utc>,
    ) -> (WalletTransaction, i64) {
        let record = WalletTransaction {
            id: entry.id,
            user_id: entry.user_id,
            entry_type: entry.entry_type,
            amount: entry.amount,
            description: entry.description,
            reference: entry.reference,
            created_at: at,
        };

        let mut balance = 0;
        if let Some(user) = self.users.get_mut(&record.user_id) {
            user.wallet_balance += record.signed_amount();
            user.updated_at = at;
            balance = user.wallet_balance;
        }

        self.wallet.push(record.clone());
        (record, balance)
    }
}

/// In-process store backing tests and the demo mode.
///
/// One writer lock guards every table, so each operation is atomic across
/// entities.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a transaction's creation time into the past. Used to exercise the
    /// stale-pending sweep.
    pub fn backdate_transaction(&self, tx_id: Uuid, by: Duration) -> bool {
        let mut tables = self.tables.write();
        match tables.transactions.get_mut(&tx_id) {
            Some(tx) => {
                tx.created_at -= by;
                true
            }
            None => false,
        }
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

fn clamp_limit(limit: i64) -> usize {
    limit.max(0) as usize
}

impl EntityStore for MemoryStore {
    fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }

    fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let mut tables = self.tables.write();

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(ApiError::Auth(AuthError::DuplicateUsername));
        }

        let now = tables.tick();
        let record = User {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            wallet_balance: 0,
            created_at: now,
            updated_at: now,
        };

        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.tables.read().users.get(&user_id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn create_meter(&self, meter: NewMeter) -> Result<Meter, ApiError> {
        let mut tables = self.tables.write();

        if tables.meter_by_number(&meter.meter_number).is_some() {
            return Err(ApiError::Conflict(format!(
                "Meter {} already exists",
                meter.meter_number
            )));
        }

        let now = tables.tick();
        let record = Meter {
            id: meter.id,
            user_id: meter.user_id,
            meter_number: meter.meter_number,
            nickname: meter.nickname,
            status: meter.status,
            created_at: now,
            updated_at: now,
        };

        tables.meters.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_meter(&self, meter_id: Uuid) -> Result<Option<Meter>, ApiError> {
        Ok(self.tables.read().meters.get(&meter_id).cloned())
    }

    fn find_meter_by_number(&self, meter_number: &str) -> Result<Option<Meter>, ApiError> {
        Ok(self.tables.read().meter_by_number(meter_number).cloned())
    }

    fn resolve_meter(&self, claim: MeterClaim) -> Result<MeterResolution, ApiError> {
        let mut tables = self.tables.write();
        let now = tables.tick();

        let existing_id = tables.meter_by_number(&claim.meter_number).map(|m| m.id);

        let Some(id) = existing_id else {
            let record = Meter {
                id: Uuid::new_v4(),
                user_id: Some(claim.user_id),
                meter_number: claim.meter_number,
                nickname: claim.nickname,
                status: MeterStatus::Active,
                created_at: now,
                updated_at: now,
            };
            tables.meters.insert(record.id, record.clone());
            return Ok(MeterResolution::Created(record));
        };

        let meter = tables
            .meters
            .get_mut(&id)
            .ok_or_else(|| ApiError::Internal("meter index out of sync".into()))?;

        let mut changed = false;
        if meter.manageable_by(claim.user_id) && !meter.has_nickname() && claim.nickname.is_some() {
            meter.nickname = claim.nickname;
            changed = true;
        }
        if meter.user_id.is_none() {
            meter.user_id = Some(claim.user_id);
            changed = true;
        }
        if changed {
            meter.updated_at = now;
        }

        Ok(MeterResolution::Existing(meter.clone()))
    }

    fn update_meter(&self, meter_id: Uuid, changes: MeterChanges) -> Result<Meter, ApiError> {
        let mut tables = self.tables.write();
        let now = tables.tick();

        let meter = tables
            .meters
            .get_mut(&meter_id)
            .ok_or_else(|| ApiError::NotFound("Meter not found".into()))?;

        if let Some(nickname) = changes.nickname {
            meter.nickname = Some(nickname);
        }
        if let Some(status) = changes.status {
            meter.status = status;
        }
        meter.updated_at = now;

        Ok(meter.clone())
    }

    fn recent_meters(&self, user_id: Uuid, limit: i64) -> Result<Vec<Meter>, ApiError> {
        let tables = self.tables.read();
        let mut meters: Vec<Meter> = tables
            .meters
            .values()
            .filter(|m| m.user_id == Some(user_id))
            .cloned()
            .collect();

        newest_first(&mut meters, |m| m.updated_at);
        meters.truncate(clamp_limit(limit));
        Ok(meters)
    }

    fn insert_pending_transaction(&self, tx: NewTransaction) -> Result<Transaction, ApiError> {
        let mut tables = self.tables.write();

        if let Some(key) = tx.idempotency_key.as_deref() {
            let taken = tables
                .transactions
                .values()
                .any(|t| t.user_id == tx.user_id && t.idempotency_key.as_deref() == Some(key));
            if taken {
                return Err(ApiError::Conflict("Idempotency key already used".into()));
            }
        }

        // one live payment per debt, matching transactions_debt_in_flight
        if let Some(debt_id) = tx.debt_id {
            let reserved = tables.transactions.values().any(|t| {
                t.debt_id == Some(debt_id)
                    && matches!(t.status, TransactionStatus::Pending | TransactionStatus::Success)
            });
            if reserved {
                return Err(ApiError::Conflict("Debt payment already in progress".into()));
            }
        }

        let now = tables.tick();
        let record = Transaction {
            id: tx.id,
            user_id: tx.user_id,
            meter_number: tx.meter_number,
            debt_id: tx.debt_id,
            amount: tx.amount,
            total: tx.total,
            status: TransactionStatus::Pending,
            payment_method: tx.payment_method,
            transaction_type: tx.transaction_type,
            token: None,
            units: None,
            idempotency_key: tx.idempotency_key,
            failure_reason: None,
            created_at: now,
            settled_at: None,
        };

        tables.transactions.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_transaction(
        &self,
        user_id: Uuid,
        tx_id: Uuid,
    ) -> Result<Option<Transaction>, ApiError> {
        Ok(self
            .tables
            .read()
            .transactions
            .get(&tx_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    fn find_transaction_by_idempotency_key(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        Ok(self
            .tables
            .read()
            .transactions
            .values()
            .find(|t| t.user_id == user_id && t.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    fn list_transactions(
        &self,
        user_id: Uuid,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>, ApiError> {
        let tables = self.tables.read();
        let mut txs: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();

        newest_first(&mut txs, |t| t.created_at);
        Ok(txs)
    }

    fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut txs = self.list_transactions(user_id, None)?;
        txs.truncate(clamp_limit(limit));
        Ok(txs)
    }

    fn transaction_stats(&self, user_id: Uuid) -> Result<TransactionStats, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .values()
            .filter(|t| t.user_id == user_id && t.status == TransactionStatus::Success)
            .fold(TransactionStats::default(), |acc, t| TransactionStats {
                total_spent: acc.total_spent + t.amount,
                transaction_count: acc.transaction_count + 1,
            }))
    }

    fn settle_transaction(&self, settlement: Settlement) -> Result<Transaction, ApiError> {
        if !settlement.is_consistent() {
            return Err(ApiError::Internal("inconsistent settlement".into()));
        }

        let mut tables = self.tables.write();

        // every precondition is checked before the first mutation
        let tx = tables
            .transactions
            .get(&settlement.transaction_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

        if tx.status.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "Transaction {} is already {}",
                tx.id, tx.status
            )));
        }

        if let Some(token) = settlement.token.as_deref() {
            if tables.tokens.contains(token) {
                return Err(ApiError::DuplicateToken);
            }
        }

        if let Some(debit) = settlement.wallet_debit.as_ref() {
            let available = tables.balance_of(tx.user_id)?;
            if available < debit.amount {
                return Err(ApiError::InsufficientFunds {
                    available,
                    requested: debit.amount,
                });
            }
        }

        if let Some(debt_id) = settlement.debt_id {
            let debt = tables
                .debts
                .get(&debt_id)
                .filter(|d| d.user_id == tx.user_id)
                .ok_or_else(|| ApiError::NotFound("Debt not found".into()))?;
            if debt.is_paid {
                return Err(ApiError::AlreadyPaid(debt_id));
            }
        }

        let now = tables.tick();

        if let Some(debit) = settlement.wallet_debit {
            tables.push_wallet_entry(
                NewWalletTransaction {
                    id: Uuid::new_v4(),
                    user_id: tx.user_id,
                    entry_type: debit.entry_type,
                    amount: debit.amount,
                    description: debit.description,
                    reference: Some(tx.id.to_string()),
                },
                now,
            );
        }

        if let Some(debt_id) = settlement.debt_id {
            if let Some(debt) = tables.debts.get_mut(&debt_id) {
                debt.is_paid = true;
                debt.settled_by = Some(tx.id);
                debt.paid_at = Some(now);
                debt.updated_at = now;
            }
        }

        if let Some(token) = settlement.token.as_ref() {
            tables.tokens.insert(token.clone());
        }

        tables.touch_meter(&tx.meter_number, now);

        let record = tables
            .transactions
            .get_mut(&tx.id)
            .ok_or_else(|| ApiError::Internal("transaction index out of sync".into()))?;
        record.status = settlement.status;
        record.token = settlement.token;
        record.units = settlement.units;
        record.failure_reason = settlement.failure_reason;
        record.settled_at = Some(now);

        debug!(tx_id = %record.id, status = %record.status, "memory_store.settle: applied");
        Ok(record.clone())
    }

    fn fail_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<Uuid>, ApiError> {
        let mut tables = self.tables.write();
        let now = tables.tick();

        let stale: Vec<Uuid> = tables
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Pending && t.created_at < cutoff)
            .map(|t| t.id)
            .collect();

        for id in &stale {
            if let Some(tx) = tables.transactions.get_mut(id) {
                tx.status = TransactionStatus::Failed;
                tx.failure_reason = Some(reason.to_string());
                tx.settled_at = Some(now);
            }
        }

        Ok(stale)
    }

    fn create_debt(&self, debt: NewDebt) -> Result<Debt, ApiError> {
        let mut tables = self.tables.write();

        if !tables.users.contains_key(&debt.user_id) {
            return Err(ApiError::NotFound("User not found".into()));
        }

        let now = tables.tick();
        let record = Debt {
            id: debt.id,
            user_id: debt.user_id,
            meter_number: debt.meter_number,
            amount: debt.amount,
            category: debt.category,
            due_date: debt.due_date,
            description: debt.description,
            is_paid: false,
            settled_by: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        tables.debts.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_debt(&self, user_id: Uuid, debt_id: Uuid) -> Result<Option<Debt>, ApiError> {
        Ok(self
            .tables
            .read()
            .debts
            .get(&debt_id)
            .filter(|d| d.user_id == user_id)
            .cloned())
    }

    fn list_debts(&self, user_id: Uuid, filter: DebtFilter) -> Result<Vec<Debt>, ApiError> {
        let tables = self.tables.read();
        let mut debts: Vec<Debt> = tables
            .debts
            .values()
            .filter(|d| d.user_id == user_id && filter.matches(d.is_paid))
            .cloned()
            .collect();

        debts.sort_by_key(|d| (d.due_date, d.created_at));
        Ok(debts)
    }

    fn wallet_balance(&self, user_id: Uuid) -> Result<i64, ApiError> {
        self.tables.read().balance_of(user_id)
    }

    fn ledger_sum(&self, user_id: Uuid) -> Result<i64, ApiError> {
        let tables = self.tables.read();
        tables.balance_of(user_id)?;
        Ok(tables
            .wallet
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(WalletTransaction::signed_amount)
            .sum())
    }

    fn apply_wallet_entry(
        &self,
        entry: NewWalletTransaction,
    ) -> Result<(WalletTransaction, i64), ApiError> {
        let mut tables = self.tables.write();

        let available = tables.balance_of(entry.user_id)?;

        if let Some(reference) = entry.reference.as_deref() {
            if tables.reference_taken(entry.user_id, reference) {
                return Err(ApiError::Conflict("Wallet reference already used".into()));
            }
        }

        if entry.entry_type.is_debit() && available < entry.amount {
            return Err(ApiError::InsufficientFunds {
                available,
                requested: entry.amount,
            });
        }

        let now = tables.tick();
        Ok(tables.push_wallet_entry(entry, now))
    }

    fn find_wallet_entry_by_reference(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Option<WalletTransaction>, ApiError> {
        Ok(self
            .tables
            .read()
            .wallet
            .iter()
            .find(|e| e.user_id == user_id && e.reference.as_deref() == Some(reference))
            .cloned())
    }

    fn list_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .wallet
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(clamp_limit(limit))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterpay_primitives::models::entities::{
        PaymentMethod, TransactionType, WalletEntryType,
    };

    fn user(store: &MemoryStore) -> User {
        store
            .create_user(NewUser {
                id: Uuid::new_v4(),
                username: format!("user_{}", Uuid::new_v4().simple()),
                password_hash: "hash".into(),
                full_name: None,
                email: None,
                phone: None,
                address: None,
            })
            .unwrap()
    }

    fn pending(store: &MemoryStore, user_id: Uuid, amount: i64) -> Transaction {
        store
            .insert_pending_transaction(NewTransaction {
                id: Uuid::new_v4(),
                user_id,
                meter_number: "12345678901".into(),
                debt_id: None,
                amount,
                total: amount,
                status: TransactionStatus::Pending,
                payment_method: PaymentMethod::Wallet,
                transaction_type: TransactionType::Recharge,
                idempotency_key: None,
            })
            .unwrap()
    }

    fn deposit(store: &MemoryStore, user_id: Uuid, amount: i64) {
        store
            .apply_wallet_entry(NewWalletTransaction {
                id: Uuid::new_v4(),
                user_id,
                entry_type: WalletEntryType::Deposit,
                amount,
                description: "Account top-up".into(),
                reference: None,
            })
            .unwrap();
    }

    #[test]
    fn debt_accepts_one_live_payment_at_a_time() {
        let store = MemoryStore::new();
        let owner = user(&store);
        let debt_id = Uuid::new_v4();

        let payment = |store: &MemoryStore| {
            store.insert_pending_transaction(NewTransaction {
                id: Uuid::new_v4(),
                user_id: owner.id,
                meter_number: "12345678901".into(),
                debt_id: Some(debt_id),
                amount: 1500,
                total: 1550,
                status: TransactionStatus::Pending,
                payment_method: PaymentMethod::Card,
                transaction_type: TransactionType::DebtPayment,
                idempotency_key: None,
            })
        };

        let first = payment(&store).unwrap();
        assert!(matches!(payment(&store), Err(ApiError::Conflict(_))));

        store
            .settle_transaction(Settlement::failed(first.id, "Payment declined"))
            .unwrap();
        assert!(payment(&store).is_ok());
    }

    #[test]
    fn settlement_is_applied_at_most_once() {
        let store = MemoryStore::new();
        let owner = user(&store);
        let tx = pending(&store, owner.id, 1000);

        let settled = store
            .settle_transaction(Settlement::failed(tx.id, "Payment declined"))
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Failed);

        let again = store.settle_transaction(Settlement::success(tx.id));
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn failed_debit_leaves_everything_untouched() {
        let store = MemoryStore::new();
        let owner = user(&store);
        deposit(&store, owner.id, 500);
        let tx = pending(&store, owner.id, 1000);

        let result = store.settle_transaction(
            Settlement::success(tx.id)
                .with_token("1111-2222-3333-4444".into(), 100)
                .with_wallet_debit(WalletEntryType::Withdrawal, 1000, "Meter recharge"),
        );

        assert!(matches!(
            result,
            Err(ApiError::InsufficientFunds { available: 500, requested: 1000 })
        ));
        let stored = store.find_transaction(owner.id, tx.id).unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Pending);
        assert_eq!(store.wallet_balance(owner.id).unwrap(), 500);

        // the token was never recorded, so another transaction may use it
        deposit(&store, owner.id, 1000);
        let ok = store.settle_transaction(
            Settlement::success(tx.id)
                .with_token("1111-2222-3333-4444".into(), 100)
                .with_wallet_debit(WalletEntryType::Withdrawal, 1000, "Meter recharge"),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn duplicate_tokens_are_rejected() {
        let store = MemoryStore::new();
        let owner = user(&store);
        let first = pending(&store, owner.id, 1000);
        let second = pending(&store, owner.id, 1000);

        store
            .settle_transaction(
                Settlement::success(first.id).with_token("1234-5678-9012-3456".into(), 10),
            )
            .unwrap();

        let clash = store.settle_transaction(
            Settlement::success(second.id).with_token("1234-5678-9012-3456".into(), 10),
        );
        assert!(matches!(clash, Err(ApiError::DuplicateToken)));
    }

    #[test]
    fn resolve_meter_claims_unowned_and_keeps_nickname() {
        let store = MemoryStore::new();
        let owner = user(&store);
        store
            .create_meter(NewMeter {
                id: Uuid::new_v4(),
                user_id: None,
                meter_number: "55555555555".into(),
                nickname: Some("Shop".into()),
                status: MeterStatus::Active,
            })
            .unwrap();

        let resolved = store
            .resolve_meter(MeterClaim {
                user_id: owner.id,
                meter_number: "55555555555".into(),
                nickname: Some("Kiosk".into()),
            })
            .unwrap();

        assert!(!resolved.was_created());
        let meter = resolved.into_meter();
        assert_eq!(meter.user_id, Some(owner.id));
        assert_eq!(meter.nickname.as_deref(), Some("Shop"));
    }

    #[test]
    fn recent_meters_follow_activity() {
        let store = MemoryStore::new();
        let owner = user(&store);

        for number in ["10000000001", "10000000002", "10000000003"] {
            store
                .resolve_meter(MeterClaim {
                    user_id: owner.id,
                    meter_number: number.into(),
                    nickname: None,
                })
                .unwrap();
        }

        let first = store.find_meter_by_number("10000000001").unwrap().unwrap();
        store
            .update_meter(first.id, MeterChanges { nickname: Some("Home".into()), status: None })
            .unwrap();

        let recent = store.recent_meters(owner.id, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].meter_number, "10000000001");
        assert_eq!(recent[1].meter_number, "10000000003");
    }

    #[test]
    fn ledger_sum_matches_cached_balance() {
        let store = MemoryStore::new();
        let owner = user(&store);
        deposit(&store, owner.id, 10_000);
        store
            .apply_wallet_entry(NewWalletTransaction {
                id: Uuid::new_v4(),
                user_id: owner.id,
                entry_type: WalletEntryType::Withdrawal,
                amount: 5_000,
                description: "Meter recharge".into(),
                reference: None,
            })
            .unwrap();
        deposit(&store, owner.id, 3_525);

        assert_eq!(store.wallet_balance(owner.id).unwrap(), 8_525);
        assert_eq!(store.ledger_sum(owner.id).unwrap(), 8_525);
    }
}
