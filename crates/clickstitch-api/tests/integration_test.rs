// Integration tests for the Clickstitch API
// Run with: cargo test --test integration_test -- --ignored
// Requires a running server (plus history store, registry, and forwarder)

use clickstitch_core::SessionStamp;
use serde_json::json;

const API_BASE_URL: &str = "http://localhost:9000";

#[tokio::test]
#[ignore] // Needs the full stack up; see header
async fn test_burst_of_clicks_shares_one_session() {
    let client = reqwest::Client::new();

    let event = json!({
        "application_token": "tok-integration",
        "application_url": "https://shop.example",
        "cookie_id": "integration-visitor",
        "button_name": "checkout",
    });

    let first = client
        .post(format!("{}/v1/events/button", API_BASE_URL))
        .json(&event)
        .send()
        .await
        .expect("Failed to send first event");
    assert_eq!(first.status(), 202, "Expected 202 Accepted");
    let first: SessionStamp = first.json().await.expect("Failed to parse stamp");
    assert_eq!(first.sequence, 1);

    // Fired immediately, well inside the continuation threshold
    let second = client
        .post(format!("{}/v1/events/button", API_BASE_URL))
        .json(&event)
        .send()
        .await
        .expect("Failed to send second event");
    assert_eq!(second.status(), 202);
    let second: SessionStamp = second.json().await.expect("Failed to parse stamp");

    assert_eq!(second.activity_id, first.activity_id);
    assert_eq!(second.sequence, first.sequence + 1);
}
