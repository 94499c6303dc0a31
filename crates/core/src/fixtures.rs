//! Demo dataset loaded into an empty store: one user with meters, recharge
//! history, open debts and a funded wallet.

use crate::repositories::{EntityStore, Settlement};
use crate::services::token_service::TokenService;
use chrono::{Duration, Utc};
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::app_state::billing_details::BillingInfo;
use meterpay_primitives::models::entities::{
    DebtCategory, MeterStatus, NewDebt, NewMeter, NewTransaction, NewUser, NewWalletTransaction,
    PaymentMethod, TransactionStatus, TransactionType, User, WalletEntryType,
};
use meterpay_primitives::utility::units_for;
use tracing::info;
use uuid::Uuid;

pub const DEMO_USERNAME: &str = "demo_user";
pub const DEMO_PASSWORD: &str = "password123";

/// Seeds the demo dataset unless the demo user already exists.
/// Returns the demo user either way.
pub fn seed_demo_data(
    store: &dyn EntityStore,
    billing: &BillingInfo,
    password_hash: String,
) -> Result<User, ApiError> {
    if let Some(existing) = store.find_user_by_username(DEMO_USERNAME)? {
        info!(user_id = %existing.id, "fixtures: demo data already present");
        return Ok(existing);
    }

    let user = store.create_user(NewUser {
        id: Uuid::new_v4(),
        username: DEMO_USERNAME.into(),
        password_hash,
        full_name: Some("John Doe".into()),
        email: Some("john.doe@example.com".into()),
        phone: Some("123-456-7890".into()),
        address: Some("123 Main St, City, Country".into()),
    })?;

    for (number, nickname, status) in [
        ("55555555555", "Shop", MeterStatus::Active),
        ("09876543210", "Office", MeterStatus::Active),
        ("12345678901", "Home", MeterStatus::Active),
        ("M-10256", "Apartment", MeterStatus::Inactive),
    ] {
        store.create_meter(NewMeter {
            id: Uuid::new_v4(),
            user_id: Some(user.id),
            meter_number: number.into(),
            nickname: Some(nickname.into()),
            status,
        })?;
    }

    // oldest first, so the newest recharge shows at the top
    for (number, amount, method, succeeded) in [
        ("55555555555", 5000, PaymentMethod::Mobile, true),
        ("12345678901", 1500, PaymentMethod::Card, false),
        ("09876543210", 3500, PaymentMethod::Mobile, true),
        ("12345678901", 2000, PaymentMethod::Card, true),
    ] {
        let tx = store.insert_pending_transaction(NewTransaction {
            id: Uuid::new_v4(),
            user_id: user.id,
            meter_number: number.into(),
            debt_id: None,
            amount,
            total: amount + billing.service_fee,
            status: TransactionStatus::Pending,
            payment_method: method,
            transaction_type: TransactionType::Recharge,
            idempotency_key: None,
        })?;

        let settlement = if succeeded {
            Settlement::success(tx.id)
                .with_token(TokenService::generate(), units_for(amount, billing.unit_price))
        } else {
            Settlement::failed(tx.id, "Payment declined by processor")
        };
        store.settle_transaction(settlement)?;
    }

    let now = Utc::now();
    for (number, amount, category, due_in_days, description) in [
        ("12345678901", 3550, DebtCategory::Water, 14, "Water bill arrears"),
        ("09876543210", 5000, DebtCategory::Maintenance, 19, "Meter maintenance fee"),
        ("12345678901", 4575, DebtCategory::Electricity, 9, "Outstanding electricity balance"),
    ] {
        store.create_debt(NewDebt {
            id: Uuid::new_v4(),
            user_id: user.id,
            meter_number: number.into(),
            amount,
            category,
            due_date: now + Duration::days(due_in_days),
            description: Some(description.into()),
        })?;
    }

    for (entry_type, amount, description) in [
        (WalletEntryType::Deposit, 10_000, "Account top-up"),
        (WalletEntryType::Withdrawal, 5_000, "Meter recharge"),
        (WalletEntryType::Deposit, 3_525, "Account top-up"),
    ] {
        store.apply_wallet_entry(NewWalletTransaction {
            id: Uuid::new_v4(),
            user_id: user.id,
            entry_type,
            amount,
            description: description.into(),
            reference: None,
        })?;
    }

    info!(user_id = %user.id, "fixtures: demo data seeded");

    store
        .find_user(user.id)?
        .ok_or_else(|| ApiError::Internal("demo user vanished after seeding".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use meterpay_primitives::models::entities::DebtFilter;

    #[test]
    fn seeds_once_with_consistent_balances() {
        let store = MemoryStore::new();
        let billing = BillingInfo::default();

        let user = seed_demo_data(&store, &billing, "hash".into()).unwrap();
        let again = seed_demo_data(&store, &billing, "other".into()).unwrap();
        assert_eq!(user.id, again.id);

        assert_eq!(user.wallet_balance, 8_525);
        assert_eq!(store.ledger_sum(user.id).unwrap(), 8_525);

        let stats = store.transaction_stats(user.id).unwrap();
        assert_eq!(stats.total_spent, 10_500);
        assert_eq!(stats.transaction_count, 3);

        let pending = store.list_debts(user.id, DebtFilter::Pending).unwrap();
        assert_eq!(pending.len(), 3);

        let recent = store.recent_transactions(user.id, 5).unwrap();
        assert_eq!(recent[0].amount, 2000);
        assert!(recent
            .iter()
            .all(|t| t.token.is_some() == (t.status == TransactionStatus::Success)));
    }
}
