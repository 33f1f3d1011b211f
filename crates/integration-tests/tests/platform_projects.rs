//! Integration tests for project CRUD and engagement.
//!
//! Run with: `cargo test -p hackdeck-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use hackdeck_integration_tests::{platform_base_url, session_client, test_email};

/// Register a fresh user and return the signed-in client.
async fn signed_in_client() -> Client {
    let client = session_client();
    let resp = client
        .post(format!("{}/auth/register", platform_base_url()))
        .json(&json!({
            "email": test_email("projects"),
            "password": "integration-test-pw"
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    client
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_project_create_and_view_count() {
    let client = signed_in_client().await;
    let base_url = platform_base_url();

    let created: Value = client
        .post(format!("{base_url}/projects"))
        .json(&json!({
            "title": "Emulator Smoke Project",
            "tech": ["rust", "axum"]
        }))
        .send()
        .await
        .expect("create request failed")
        .json()
        .await
        .expect("invalid JSON");
    let id = created["project"]["id"].as_str().expect("project id");
    assert_eq!(created["project"]["views"], 0);

    // Each detail read counts a view.
    let shown: Value = client
        .get(format!("{base_url}/projects/{id}"))
        .send()
        .await
        .expect("show request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(shown["project"]["views"], 1);
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_like_is_idempotent() {
    let client = signed_in_client().await;
    let base_url = platform_base_url();

    let created: Value = client
        .post(format!("{base_url}/projects"))
        .json(&json!({ "title": "Like Target" }))
        .send()
        .await
        .expect("create request failed")
        .json()
        .await
        .expect("invalid JSON");
    let id = created["project"]["id"].as_str().expect("project id");

    let first: Value = client
        .post(format!("{base_url}/projects/{id}/like"))
        .send()
        .await
        .expect("like request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(first["changed"], json!(true));

    // A second like changes nothing.
    let second: Value = client
        .post(format!("{base_url}/projects/{id}/like"))
        .send()
        .await
        .expect("like request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(second["changed"], json!(false));

    let shown: Value = client
        .get(format!("{base_url}/projects/{id}"))
        .send()
        .await
        .expect("show request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(shown["project"]["likes"], 1);
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_updating_foreign_project_is_forbidden() {
    let owner = signed_in_client().await;
    let base_url = platform_base_url();

    let created: Value = owner
        .post(format!("{base_url}/projects"))
        .json(&json!({ "title": "Someone Else's" }))
        .send()
        .await
        .expect("create request failed")
        .json()
        .await
        .expect("invalid JSON");
    let id = created["project"]["id"].as_str().expect("project id");

    let other = signed_in_client().await;
    let resp = other
        .patch(format!("{base_url}/projects/{id}"))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
