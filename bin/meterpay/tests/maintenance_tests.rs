mod common;

use chrono::Duration;
use common::*;
use meterpay_core::repositories::Settlement;
use meterpay_core::services::maintenance_service::{MaintenanceService, STALE_PENDING_REASON};
use meterpay_primitives::models::entities::{
    NewTransaction, PaymentMethod, TransactionStatus, TransactionType,
};
use uuid::Uuid;

fn pending_recharge(user_id: Uuid) -> NewTransaction {
    NewTransaction {
        id: Uuid::new_v4(),
        user_id,
        meter_number: "12345678901".to_string(),
        debt_id: None,
        amount: 2000,
        total: 2050,
        status: TransactionStatus::Pending,
        payment_method: PaymentMethod::Card,
        transaction_type: TransactionType::Recharge,
        idempotency_key: None,
    }
}

#[tokio::test]
async fn sweep_fails_only_stale_pending_transactions() {
    let (state, store) = create_test_app_state_with_store(declining_gateway());
    let (user, _) = create_test_user(&state, "sweeper");

    let stale = state.store.insert_pending_transaction(pending_recharge(user.id)).unwrap();
    let fresh = state.store.insert_pending_transaction(pending_recharge(user.id)).unwrap();
    assert!(store.backdate_transaction(stale.id, Duration::minutes(10)));

    let swept = MaintenanceService::sweep_stale_pending(&state).await.unwrap();
    assert_eq!(swept, 1);

    let stale = state.store.find_transaction(user.id, stale.id).unwrap().unwrap();
    assert_eq!(stale.status, TransactionStatus::Failed);
    assert_eq!(stale.failure_reason.as_deref(), Some(STALE_PENDING_REASON));
    assert!(stale.settled_at.is_some());
    assert!(stale.token.is_none());

    let fresh = state.store.find_transaction(user.id, fresh.id).unwrap().unwrap();
    assert_eq!(fresh.status, TransactionStatus::Pending);

    // a second pass has nothing left to do
    assert_eq!(MaintenanceService::sweep_stale_pending(&state).await.unwrap(), 0);
}

#[tokio::test]
async fn sweep_leaves_settled_transactions_alone() {
    let (state, store) = create_test_app_state_with_store(declining_gateway());
    let (user, _) = create_test_user(&state, "settled");

    let tx = state.store.insert_pending_transaction(pending_recharge(user.id)).unwrap();
    let settled = state
        .store
        .settle_transaction(Settlement::failed(tx.id, "Payment declined by processor"))
        .unwrap();
    store.backdate_transaction(settled.id, Duration::hours(1));

    assert_eq!(MaintenanceService::sweep_stale_pending(&state).await.unwrap(), 0);

    let stored = state.store.find_transaction(user.id, tx.id).unwrap().unwrap();
    assert_eq!(stored.failure_reason.as_deref(), Some("Payment declined by processor"));
}
