mod common;

use axum::http::StatusCode;
use common::*;
use meterpay_core::repositories::Settlement;
use meterpay_core::services::ledger_service::LedgerService;
use meterpay_core::services::payment_service::PaymentService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::debt_dto::PayDebtRequest;
use meterpay_primitives::models::dtos::transaction_dto::PurchaseRequest;
use meterpay_primitives::models::entities::{MeterChanges, MeterStatus, PaymentMethod, TransactionStatus};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

fn purchase(meter_number: &str, amount: i64, payment_method: PaymentMethod) -> PurchaseRequest {
    PurchaseRequest {
        meter_number: meter_number.to_string(),
        amount,
        payment_method,
        nickname: None,
        idempotency_key: None,
    }
}

#[tokio::test]
async fn card_purchase_charges_the_service_fee() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "card_buyer");
    let server = create_test_server(state.clone());

    let res = bearer(server.post("/api/transactions"), &token)
        .json(&json!({
            "meterNumber": "55555555555",
            "amount": 2000,
            "paymentMethod": "card",
            "nickname": "Shop"
        }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let tx: Value = res.json();
    assert_eq!(tx["status"], "success");
    assert_eq!(tx["total"], 2050);
    assert_eq!(tx["fee"], 50);

    // card purchases never touch the wallet
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 0);

    let meter = state.store.find_meter_by_number("55555555555").unwrap().unwrap();
    assert_eq!(meter.user_id, Some(user.id));
    assert_eq!(meter.nickname.as_deref(), Some("Shop"));
}

#[tokio::test]
async fn declined_payment_is_recorded_as_failed() {
    let state = create_test_app_state_with(declining_gateway());
    let (user, _) = create_test_user(&state, "declined");

    let tx = PaymentService::submit_purchase(&state, user.id, purchase("12345678901", 1500, PaymentMethod::Card))
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.failure_reason.as_deref(), Some("Payment declined by processor"));
    assert!(tx.token.is_none());
    assert!(tx.units.is_none());
    assert!(tx.settled_at.is_some());
}

#[tokio::test]
async fn gateway_timeout_fails_the_transaction() {
    let state = create_test_app_state_with(slow_gateway());
    let (user, _) = create_test_user(&state, "timeout");

    let tx = PaymentService::submit_purchase(&state, user.id, purchase("12345678901", 1500, PaymentMethod::Mobile))
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.failure_reason.as_deref(), Some("Payment authorization timed out"));
    assert!(tx.token.is_none());
}

#[tokio::test]
async fn unreachable_gateway_fails_the_transaction() {
    let state = create_test_app_state_with(Arc::new(UnavailableGateway));
    let (user, _) = create_test_user(&state, "unavailable");

    let tx = PaymentService::submit_purchase(&state, user.id, purchase("12345678901", 1500, PaymentMethod::Card))
        .await
        .unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.failure_reason.as_deref(), Some("Payment processor unavailable"));
}

#[tokio::test]
async fn settled_transactions_never_change_again() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "monotonic");
    fund_wallet(&state, user.id, 5000);

    let tx = PaymentService::submit_purchase(&state, user.id, purchase("12345678901", 2000, PaymentMethod::Wallet))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Success);

    let again = state
        .store
        .settle_transaction(Settlement::failed(tx.id, "late decline"));
    assert!(matches!(again, Err(ApiError::Conflict(_))));

    let stored = state.store.find_transaction(user.id, tx.id).unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Success);
    assert_eq!(stored.token, tx.token);
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 3000);
}

#[tokio::test]
async fn issued_tokens_are_unique() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "tokens");

    let mut tokens = HashSet::new();
    for i in 0..50 {
        let tx = PaymentService::submit_purchase(
            &state,
            user.id,
            purchase("12345678901", 100 + i, PaymentMethod::Card),
        )
        .await
        .unwrap();
        let token = tx.token.expect("successful recharge carries a token");
        assert!(tokens.insert(token));
    }
    assert_eq!(tokens.len(), 50);
}

#[tokio::test]
async fn idempotency_key_replays_the_original_purchase() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "replay");
    fund_wallet(&state, user.id, 5000);
    let server = create_test_server(state.clone());

    let body = json!({
        "meterNumber": "12345678901",
        "amount": 2000,
        "paymentMethod": "wallet",
        "idempotencyKey": "recharge-0001"
    });

    let first: Value = bearer(server.post("/api/transactions"), &token)
        .json(&body)
        .await
        .json();
    let second: Value = bearer(server.post("/api/transactions"), &token)
        .json(&body)
        .await
        .json();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["token"], second["token"]);
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 3000);
    assert_eq!(state.store.list_transactions(user.id, None).unwrap().len(), 1);
}

#[tokio::test]
async fn inactive_meter_is_refused_before_anything_is_written() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "inactive");
    fund_wallet(&state, user.id, 5000);
    let server = create_test_server(state.clone());

    bearer(server.post("/api/meters"), &token)
        .json(&json!({ "meterNumber": "M-10256" }))
        .await
        .assert_status(StatusCode::CREATED);
    let meter = state.store.find_meter_by_number("M-10256").unwrap().unwrap();
    state
        .store
        .update_meter(
            meter.id,
            MeterChanges {
                nickname: None,
                status: Some(MeterStatus::Inactive),
            },
        )
        .unwrap();

    let res = bearer(server.post("/api/transactions"), &token)
        .json(&json!({
            "meterNumber": "M-10256",
            "amount": 2000,
            "paymentMethod": "wallet"
        }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);

    assert!(state.store.list_transactions(user.id, None).unwrap().is_empty());
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 5000);
}

#[tokio::test]
async fn invalid_purchases_are_rejected() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "invalid");
    let server = create_test_server(state.clone());

    for body in [
        json!({ "meterNumber": "12345678901", "amount": 0, "paymentMethod": "card" }),
        json!({ "meterNumber": "12345678901", "amount": -500, "paymentMethod": "card" }),
        json!({ "meterNumber": "12", "amount": 2000, "paymentMethod": "card" }),
        json!({ "meterNumber": "1234 5678", "amount": 2000, "paymentMethod": "card" }),
    ] {
        let res = bearer(server.post("/api/transactions"), &token).json(&body).await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let err: Value = res.json();
        assert_eq!(err["error"], "validation_error");
    }

    assert!(state.store.list_transactions(user.id, None).unwrap().is_empty());
}

#[tokio::test]
async fn idempotency_key_only_replays_a_matching_purchase() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "key_reuse");
    let debt = create_test_debt(&state, user.id, 1500);
    let server = create_test_server(state.clone());

    bearer(server.post(&format!("/api/debts/{}/pay", debt.id)), &token)
        .json(&json!({ "paymentMethod": "card", "idempotencyKey": "shared-key-1" }))
        .await
        .assert_status(StatusCode::OK);

    let res = bearer(server.post("/api/transactions"), &token)
        .json(&json!({
            "meterNumber": "99999999999",
            "amount": 2000,
            "paymentMethod": "card",
            "idempotencyKey": "shared-key-1"
        }))
        .await;
    res.assert_status(StatusCode::CONFLICT);

    bearer(server.post("/api/transactions"), &token)
        .json(&json!({
            "meterNumber": "12345678901",
            "amount": 2000,
            "paymentMethod": "card",
            "idempotencyKey": "recharge-0002"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    // same key, different amount
    bearer(server.post("/api/transactions"), &token)
        .json(&json!({
            "meterNumber": "12345678901",
            "amount": 2500,
            "paymentMethod": "card",
            "idempotencyKey": "recharge-0002"
        }))
        .await
        .assert_status(StatusCode::CONFLICT);

    assert_eq!(state.store.list_transactions(user.id, None).unwrap().len(), 2);
    assert!(state.store.find_meter_by_number("99999999999").unwrap().is_none());
}

#[tokio::test]
async fn exhausted_token_retries_fail_the_purchase() {
    let state = create_test_app_state_with_tokens(Arc::new(FixedTokenIssuer("1111-2222-3333-4444")));
    let (user, token) = create_test_user(&state, "collide");
    fund_wallet(&state, user.id, 5000);
    let server = create_test_server(state.clone());

    let first: Value = bearer(server.post("/api/transactions"), &token)
        .json(&json!({ "meterNumber": "12345678901", "amount": 1000, "paymentMethod": "card" }))
        .await
        .json();
    assert_eq!(first["status"], "success");
    assert_eq!(first["token"], "1111-2222-3333-4444");

    let res = bearer(server.post("/api/transactions"), &token)
        .json(&json!({ "meterNumber": "12345678901", "amount": 2000, "paymentMethod": "wallet" }))
        .await;
    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = res.json();
    assert_eq!(err["error"], "token_generation_failed");

    let failed = state
        .store
        .list_transactions(user.id, Some(TransactionStatus::Failed))
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].amount, 2000);
    assert_eq!(failed[0].failure_reason.as_deref(), Some("Token generation failed"));
    assert!(failed[0].token.is_none());

    // nothing was debited for the failed recharge
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 5000);
    assert_eq!(state.store.list_wallet_transactions(user.id, 10).unwrap().len(), 1);
    assert!(LedgerService::verify(&state, user.id).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wallet_spent_during_settlement_fails_the_purchase() {
    let gate = GatedTokenIssuer::new(1);
    let state = create_test_app_state_with_tokens(gate.clone());
    let (user, _) = create_test_user(&state, "outrun");
    fund_wallet(&state, user.id, 1500);
    let debt = create_test_debt(&state, user.id, 1000);

    let purchase_task = {
        let state = state.clone();
        tokio::spawn(async move {
            PaymentService::submit_purchase(
                &state,
                user.id,
                purchase("55555555555", 1000, PaymentMethod::Wallet),
            )
            .await
        })
    };

    // the purchase has passed its funds check and is waiting for a token
    gate.wait_for_callers().await;

    let (paid, _) = PaymentService::submit_debt_payment(
        &state,
        user.id,
        debt.id,
        PayDebtRequest {
            payment_method: PaymentMethod::Wallet,
            idempotency_key: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(paid.status, TransactionStatus::Success);

    gate.release().await;
    let tx = purchase_task.await.unwrap().unwrap();

    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.failure_reason.as_deref(), Some("Insufficient wallet balance"));
    assert!(tx.token.is_none());

    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 500);
    assert_eq!(state.store.ledger_sum(user.id).unwrap(), 500);
    assert_eq!(state.store.list_wallet_transactions(user.id, 10).unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_wallet_purchases_settle_against_the_live_balance() {
    let gate = GatedTokenIssuer::new(2);
    let state = create_test_app_state_with_tokens(gate.clone());
    let (user, _) = create_test_user(&state, "photo_finish");
    fund_wallet(&state, user.id, 1000);

    let handles: Vec<_> = ["12345678901", "55555555555"]
        .into_iter()
        .map(|meter| {
            let state = state.clone();
            tokio::spawn(async move {
                PaymentService::submit_purchase(&state, user.id, purchase(meter, 1000, PaymentMethod::Wallet))
                    .await
            })
        })
        .collect();

    // both passed the funds check before either settled
    gate.wait_for_callers().await;
    assert_eq!(
        state
            .store
            .list_transactions(user.id, Some(TransactionStatus::Pending))
            .unwrap()
            .len(),
        2
    );
    gate.release().await;

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }

    let succeeded = outcomes
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Success)
        .count();
    assert_eq!(succeeded, 1);
    let loser = outcomes
        .iter()
        .find(|tx| tx.status == TransactionStatus::Failed)
        .unwrap();
    assert_eq!(loser.failure_reason.as_deref(), Some("Insufficient wallet balance"));

    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 0);
    assert_eq!(state.store.ledger_sum(user.id).unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_wallet_purchases_never_overdraw() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "racer");
    fund_wallet(&state, user.id, 5000);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            PaymentService::submit_purchase(
                &state,
                user.id,
                purchase("12345678901", 1000, PaymentMethod::Wallet),
            )
            .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(tx) if tx.status == TransactionStatus::Success => succeeded += 1,
            Ok(tx) => assert_eq!(tx.failure_reason.as_deref(), Some("Insufficient wallet balance")),
            Err(ApiError::InsufficientFunds { .. }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(succeeded, 5);
    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 0);
    assert_eq!(state.store.ledger_sum(user.id).unwrap(), 0);
    assert!(LedgerService::verify(&state, user.id).unwrap());
}
