//! Integration tests for registration, login, and sessions.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p thimble-api)
//!
//! Run with: cargo test -p thimble-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use thimble_integration_tests::{api_base_url, cookie_client, unique_email};

const TEST_PASSWORD: &str = "integration-test-pw-1";

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_login_logout_flow() {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("auth-flow");

    // Register
    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Flow Tester",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse register response");
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "user");

    // Login sets the session cookie
    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse login response");
    assert!(body["token"].is_string());

    // The cookie authenticates profile edits
    let resp = client
        .patch(format!("{base_url}/api/auth/edit-profile"))
        .json(&json!({ "bio": "Kept between requests by the cookie store" }))
        .send()
        .await
        .expect("Failed to edit profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse profile response");
    assert_eq!(body["user"]["bio"], "Kept between requests by the cookie store");

    // Logout clears the cookie; the edit now fails
    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .patch(format!("{base_url}/api/auth/edit-profile"))
        .json(&json!({ "bio": "should not apply" }))
        .send()
        .await
        .expect("Failed to send profile edit");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("auth-dup");

    let register = || {
        client
            .post(format!("{base_url}/api/auth/register"))
            .json(&json!({
                "username": "Dup Tester",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
    };

    let resp = register().await.expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = register().await.expect("Failed to re-register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_rejected() {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("auth-wrongpw");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "PW Tester",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_endpoints_reject_regular_users() {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("auth-notadmin");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Regular User",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::OK);

    // User listing is admin-only
    let resp = client
        .get(format!("{base_url}/api/auth/users"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // So is the admin dashboard
    let resp = client
        .get(format!("{base_url}/api/stats/admin-stats"))
        .send()
        .await
        .expect("Failed to get admin stats");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
