//! Integration tests for order and contact endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p thimble-api)
//!
//! Checkout-session tests are excluded; they require live payment processor
//! credentials.
//!
//! Run with: cargo test -p thimble-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use thimble_integration_tests::{api_base_url, cookie_client, unique_email};

const TEST_PASSWORD: &str = "integration-test-pw-1";

async fn signed_in_client() -> reqwest::Client {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("orders");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Order Tester",
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

    client
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_orders_for_unknown_email_is_404() {
    let client = signed_in_client().await;
    let base_url = api_base_url();
    let email = unique_email("no-orders");

    let resp = client
        .get(format!("{base_url}/api/orders/{email}"))
        .send()
        .await
        .expect("Failed to fetch orders");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_listing_requires_admin() {
    let client = signed_in_client().await;
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/orders/"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_empty_cart_checkout_rejected() {
    let client = cookie_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/orders/create-checkout-session"))
        .json(&json!({ "products": [] }))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_contact_form_round_trip() {
    let client = cookie_client();
    let base_url = api_base_url();

    // Missing fields are rejected
    let resp = client
        .post(format!("{base_url}/api/contact/"))
        .json(&json!({ "name": "", "email": "", "message": "" }))
        .send()
        .await
        .expect("Failed to send contact form");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A complete submission is recorded
    let resp = client
        .post(format!("{base_url}/api/contact/"))
        .json(&json!({
            "name": "Contact Tester",
            "email": "contact-tester@example.com",
            "message": "Do you restock the linen dress?",
        }))
        .send()
        .await
        .expect("Failed to send contact form");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse contact response");
    assert_eq!(body["contact"]["name"], "Contact Tester");

    // Listing submissions is admin-only
    let resp = client
        .get(format!("{base_url}/api/contact/"))
        .send()
        .await
        .expect("Failed to list contact messages");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_user_stats_shape() {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("stats");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Stats Tester",
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

    let resp = client
        .get(format!("{base_url}/api/stats/user-stats/{email}"))
        .send()
        .await
        .expect("Failed to fetch user stats");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse stats");
    assert_eq!(body["totalReviews"], 0);
    assert_eq!(body["totalPurchasedProducts"], 0);
}
