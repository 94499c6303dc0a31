mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn registering_a_meter_twice_returns_the_same_meter() {
    let state = create_test_app_state();
    let (user, token) = create_test_user(&state, "meter_owner");
    let server = create_test_server(state.clone());

    let first = bearer(server.post("/api/meters"), &token)
        .json(&json!({ "meterNumber": "12345678901", "nickname": "Home" }))
        .await;
    first.assert_status(StatusCode::CREATED);
    let first: Value = first.json();

    let second = bearer(server.post("/api/meters"), &token)
        .json(&json!({ "meterNumber": "12345678901", "nickname": "Cabin" }))
        .await;
    second.assert_status(StatusCode::OK);
    let second: Value = second.json();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["nickname"], "Home");
    assert_eq!(second["status"], "active");
    assert_eq!(second["userId"], user.id.to_string());
}

#[tokio::test]
async fn meters_owned_by_someone_else_cannot_be_claimed() {
    let state = create_test_app_state();
    let (_, alice) = create_test_user(&state, "alice");
    let (_, bob) = create_test_user(&state, "bob");
    let server = create_test_server(state.clone());

    bearer(server.post("/api/meters"), &alice)
        .json(&json!({ "meterNumber": "09876543210" }))
        .await
        .assert_status(StatusCode::CREATED);

    let res = bearer(server.post("/api/meters"), &bob)
        .json(&json!({ "meterNumber": "09876543210" }))
        .await;
    res.assert_status(StatusCode::CONFLICT);
    let body: Value = res.json();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn meters_can_be_renamed_and_deactivated_by_their_owner() {
    let state = create_test_app_state();
    let (_, owner) = create_test_user(&state, "renamer");
    let (_, stranger) = create_test_user(&state, "stranger");
    let server = create_test_server(state.clone());

    let created: Value = bearer(server.post("/api/meters"), &owner)
        .json(&json!({ "meterNumber": "55555555555" }))
        .await
        .json();
    let path = format!("/api/meters/{}", created["id"].as_str().unwrap());

    let res = bearer(server.patch(&path), &owner)
        .json(&json!({ "nickname": "Shop", "status": "inactive" }))
        .await;
    res.assert_status(StatusCode::OK);
    let updated: Value = res.json();
    assert_eq!(updated["nickname"], "Shop");
    assert_eq!(updated["status"], "inactive");

    bearer(server.patch(&path), &owner)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    bearer(server.get(&path), &stranger)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    bearer(server.patch(&path), &stranger)
        .json(&json!({ "nickname": "Mine" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let fetched: Value = bearer(server.get(&path), &owner).await.json();
    assert_eq!(fetched["nickname"], "Shop");
}

#[tokio::test]
async fn recent_meters_are_most_recently_used_first() {
    let state = create_test_app_state();
    let (_, token) = create_test_user(&state, "recent_meters");
    let server = create_test_server(state.clone());

    for number in ["10000000001", "10000000002", "10000000003", "10000000004", "10000000005", "10000000006"] {
        bearer(server.post("/api/meters"), &token)
            .json(&json!({ "meterNumber": number }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    // a purchase moves the oldest meter back to the top
    bearer(server.post("/api/transactions"), &token)
        .json(&json!({ "meterNumber": "10000000001", "amount": 1000, "paymentMethod": "card" }))
        .await
        .assert_status(StatusCode::CREATED);

    let res = bearer(server.get("/api/meters/recent"), &token).await;
    res.assert_status(StatusCode::OK);
    let body: Value = res.json();
    let meters = body["meters"].as_array().unwrap();

    assert_eq!(meters.len(), 5);
    assert_eq!(meters[0]["meterNumber"], "10000000001");
    assert_eq!(meters[1]["meterNumber"], "10000000006");
    assert!(meters.iter().all(|m| m["meterNumber"] != "10000000002"));
}
