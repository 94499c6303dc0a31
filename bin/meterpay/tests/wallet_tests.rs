mod common;

use axum::http::StatusCode;
use common::*;
use meterpay_core::services::ledger_service::LedgerService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::wallet_dto::AddFundsRequest;
use meterpay_primitives::models::entities::WalletEntryType;
use serde_json::{json, Value};

#[tokio::test]
async fn top_up_amount_must_be_within_bounds() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "bounds");
    let server = create_test_server(state.clone());

    for amount in [0, 499, 100_001] {
        let res = bearer(server.post("/api/wallet/add-funds"), &token)
            .json(&json!({ "amount": amount }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }

    for amount in [500, 100_000] {
        bearer(server.post("/api/wallet/add-funds"), &token)
            .json(&json!({ "amount": amount }))
            .await
            .assert_status(StatusCode::OK);
    }

    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 100_500);
}

#[tokio::test]
async fn top_up_with_same_key_credits_once() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "idempotent_top_up");

    let request = || AddFundsRequest {
        amount: 2500,
        idempotency_key: Some("top-up-0001".to_string()),
    };

    let first = LedgerService::top_up(&state, user.id, request()).await.unwrap();
    let second = LedgerService::top_up(&state, user.id, request()).await.unwrap();

    assert_eq!(first.transaction.id, second.transaction.id);
    assert_eq!(second.balance, 2500);
    assert_eq!(state.store.ledger_sum(user.id).unwrap(), 2500);
}

#[tokio::test]
async fn concurrent_top_ups_all_land() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "concurrent_top_up");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            LedgerService::top_up(
                &state,
                user.id,
                AddFundsRequest {
                    amount: 1000,
                    idempotency_key: None,
                },
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(state.store.wallet_balance(user.id).unwrap(), 20_000);
    assert_eq!(state.store.ledger_sum(user.id).unwrap(), 20_000);
    assert!(LedgerService::verify(&state, user.id).unwrap());
}

#[tokio::test]
async fn wallet_history_is_newest_first_and_limited() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "history");
    for amount in 1..=30 {
        fund_wallet(&state, user.id, amount * 100);
    }
    let server = create_test_server(state.clone());

    let body: Value = bearer(server.get("/api/wallet/transactions"), &token)
        .await
        .json();
    let entries = body["transactions"].as_array().unwrap();
    assert_eq!(entries.len(), 20);
    assert_eq!(entries[0]["amount"], 3000);

    let body: Value = bearer(server.get("/api/wallet/transactions?limit=3"), &token)
        .await
        .json();
    let amounts: Vec<i64> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["amount"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![3000, 2900, 2800]);

    let body: Value = bearer(server.get("/api/wallet/transactions?limit=500"), &token)
        .await
        .json();
    assert_eq!(body["transactions"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn balance_and_funds_checks_follow_the_entries() {
    let state = create_test_app_state();
    let (user, _) = create_test_user(&state, "funds_check");

    assert_eq!(LedgerService::current_balance(&state, user.id).unwrap(), 0);
    assert!(LedgerService::sufficient_funds(&state, user.id, 0).unwrap());
    assert!(!LedgerService::sufficient_funds(&state, user.id, 1).unwrap());

    fund_wallet(&state, user.id, 2500);
    LedgerService::apply_entry(
        &state,
        user.id,
        WalletEntryType::Withdrawal,
        1000,
        "Meter recharge",
        None,
    )
    .unwrap();

    assert_eq!(LedgerService::current_balance(&state, user.id).unwrap(), 1500);
    assert!(LedgerService::sufficient_funds(&state, user.id, 1500).unwrap());
    assert!(!LedgerService::sufficient_funds(&state, user.id, 1501).unwrap());
    assert!(LedgerService::ensure_funds(&state, user.id, 1500).is_ok());
    assert!(matches!(
        LedgerService::ensure_funds(&state, user.id, 1501),
        Err(ApiError::InsufficientFunds {
            available: 1500,
            requested: 1501
        })
    ));
}
