//! Transaction status integration tests.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::TestHarness;
use serde_json::json;

const WEBHOOK: &str = "/v1/webhooks/transactions";

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp is a string")
        .parse()
        .expect("timestamp is RFC 3339")
}

#[tokio::test]
async fn unknown_transaction_is_not_found() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/transactions/does-not-exist").await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn transaction_moves_from_processing_to_processed() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post(WEBHOOK)
        .json(&json!({ "transaction_id": "tx1", "amount": 100, "currency": "USD" }))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.json::<serde_json::Value>(), json!({ "message": "Accepted" }));

    let pending = harness.status("tx1").await;
    assert_eq!(pending["transaction_id"], "tx1");
    assert_eq!(pending["status"], "PROCESSING");
    assert!(pending["processed_at"].is_null());
    assert_eq!(pending["amount"], json!(100.0));
    assert_eq!(pending["currency"], "USD");
    assert!(pending["source_account"].is_null());

    let done = harness.wait_for_processed("tx1").await;
    assert_eq!(done["status"], "PROCESSED");
    assert_eq!(done["created_at"], pending["created_at"]);

    let created_at = timestamp(&done["created_at"]);
    let processed_at = timestamp(&done["processed_at"]);
    assert!(processed_at >= created_at);
}

#[tokio::test]
async fn observed_status_never_reverts() {
    let harness = TestHarness::new();

    harness
        .server
        .post(WEBHOOK)
        .json(&json!({ "transaction_id": "tx-mono" }))
        .await
        .assert_status(StatusCode::ACCEPTED);

    let mut seen_processed = false;
    for _ in 0..30 {
        let body = harness.status("tx-mono").await;
        match body["status"].as_str() {
            Some("PROCESSING") => {
                assert!(!seen_processed, "status reverted to PROCESSING");
                assert!(body["processed_at"].is_null());
            }
            Some("PROCESSED") => {
                seen_processed = true;
                assert!(!body["processed_at"].is_null());
            }
            other => panic!("unexpected status {other:?}"),
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    harness.wait_for_processed("tx-mono").await;
}

#[tokio::test]
async fn decimal_amount_is_rendered_as_number() {
    let harness = TestHarness::new();

    harness
        .server
        .post(WEBHOOK)
        .json(&json!({ "transaction_id": "tx-dec", "amount": "19.75" }))
        .await
        .assert_status(StatusCode::ACCEPTED);

    let body = harness.status("tx-dec").await;
    assert_eq!(body["amount"], json!(19.75));
}
