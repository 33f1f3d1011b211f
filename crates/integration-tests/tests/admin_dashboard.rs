//! Integration tests for the admin back-office.
//!
//! These tests require:
//! - The admin server running (`cargo run -p hackdeck-admin`)
//! - `ADMIN_API_TOKEN` in the environment, matching the server's
//!
//! Run with: `cargo test -p hackdeck-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::Value;

use hackdeck_integration_tests::admin_base_url;

fn admin_token() -> String {
    std::env::var("ADMIN_API_TOKEN").unwrap_or_default()
}

fn client() -> Client {
    Client::new()
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_dashboard_requires_token() {
    let resp = client()
        .get(format!("{}/dashboard", admin_base_url()))
        .send()
        .await
        .expect("dashboard request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_dashboard_stats_shape() {
    let resp = client()
        .get(format!("{}/dashboard", admin_base_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("dashboard request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid JSON");
    let stats = &body["stats"];
    for key in [
        "users",
        "projects",
        "hackathons",
        "applications",
        "signups_last_30_days",
    ] {
        assert!(stats[key].is_i64(), "missing stat {key}");
    }
    assert!(stats["applications_by_status"]["submitted"].is_i64());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_users_listing() {
    let resp = client()
        .get(format!("{}/users?limit=5", admin_base_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("users request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("invalid JSON");
    assert!(body["users"].is_array());
}
