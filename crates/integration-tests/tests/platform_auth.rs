//! Integration tests for platform authentication.
//!
//! These tests require:
//! - The platform server running against the document store and identity
//!   emulators (`cargo run -p hackdeck-platform`)
//!
//! Run with: `cargo test -p hackdeck-integration-tests -- --ignored`

use reqwest::StatusCode;
use serde_json::{Value, json};

use hackdeck_integration_tests::{platform_base_url, session_client, test_email};

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_register_creates_profile() {
    let client = session_client();
    let base_url = platform_base_url();
    let email = test_email("register");

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "email": email,
            "password": "integration-test-pw",
            "display_name": "Integration Test"
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("invalid JSON");
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["linked_methods"][0], "password");

    // The session resolves to signed-in with the profile.
    let me: Value = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("me request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert!(me["state"] == "signed_in" || me["state"] == "resolving");
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_duplicate_registration_conflicts() {
    let client = session_client();
    let base_url = platform_base_url();
    let email = test_email("dup");

    let body = json!({ "email": email, "password": "integration-test-pw" });
    let first = client
        .post(format!("{base_url}/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("register request failed");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = session_client()
        .post(format!("{base_url}/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("register request failed");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_login_then_methods_lists_password() {
    let client = session_client();
    let base_url = platform_base_url();
    let email = test_email("login");

    client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({ "email": email, "password": "integration-test-pw" }))
        .send()
        .await
        .expect("register request failed");

    let fresh = session_client();
    let login = fresh
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": "integration-test-pw" }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(login.status(), StatusCode::OK);

    let methods: Value = fresh
        .get(format!("{base_url}/auth/methods"))
        .send()
        .await
        .expect("methods request failed")
        .json()
        .await
        .expect("invalid JSON");
    assert_eq!(methods["linked_methods"], json!(["password"]));
    assert_eq!(methods["can_unlink"], json!(false));
}

#[tokio::test]
#[ignore = "Requires running platform server and emulators"]
async fn test_unlink_sole_method_is_rejected() {
    let client = session_client();
    let base_url = platform_base_url();
    let email = test_email("unlink");

    client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({ "email": email, "password": "integration-test-pw" }))
        .send()
        .await
        .expect("register request failed");

    let resp = client
        .post(format!("{base_url}/auth/unlink"))
        .json(&json!({ "method": "password" }))
        .send()
        .await
        .expect("unlink request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
