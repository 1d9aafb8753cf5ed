//! Integration tests for the product catalog.
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

/// Register and login a fresh user, returning the authenticated client.
async fn signed_in_client() -> reqwest::Client {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("products");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Catalog Tester",
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
async fn test_create_and_fetch_product() {
    let client = signed_in_client().await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/products/create-product"))
        .json(&json!({
            "name": "Integration Test Jacket",
            "category": "outerwear",
            "price": "129.50",
            "color": "green",
            "sizes": ["S", "M"],
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(created["name"], "Integration Test Jacket");
    assert_eq!(created["rating"], "0");

    let id = created["id"].as_i64().expect("Product id missing");
    let resp = client
        .get(format!("{base_url}/api/products/{id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse product page");
    assert_eq!(body["product"]["name"], "Integration Test Jacket");
    assert!(body["product"]["author"]["email"].is_string());
    assert!(body["reviews"].as_array().is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_listing_filters_and_pagination() {
    let client = cookie_client();
    let base_url = api_base_url();

    // "all" filters behave like no filter
    let resp = client
        .get(format!(
            "{base_url}/api/products/?category=all&color=all&page=1&limit=5"
        ))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    let products = body["products"].as_array().expect("products missing");
    assert!(products.len() <= 5);
    assert!(body["totalProducts"].is_number());
    assert!(body["totalPages"].is_number());

    // Price window excludes out-of-range products
    let resp = client
        .get(format!(
            "{base_url}/api/products/?minPrice=100000&maxPrice=200000"
        ))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse listing");
    assert_eq!(body["products"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_related_products_excludes_self() {
    let client = signed_in_client().await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/products/create-product"))
        .json(&json!({
            "name": "Related Test Scarf",
            "category": "accessories",
            "price": "24.00",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    let id = created["id"].as_i64().expect("Product id missing");

    let resp = client
        .get(format!("{base_url}/api/products/related/{id}"))
        .send()
        .await
        .expect("Failed to fetch related products");
    assert_eq!(resp.status(), StatusCode::OK);
    let related: Value = resp.json().await.expect("Failed to parse related products");
    let related = related.as_array().expect("expected array");
    assert!(related.len() <= 6);
    assert!(related.iter().all(|p| p["id"].as_i64() != Some(id)));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_update_requires_admin() {
    let client = signed_in_client().await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/products/create-product"))
        .json(&json!({
            "name": "Unpromotable Hat",
            "price": "15.00",
        }))
        .send()
        .await
        .expect("Failed to create product");
    let created: Value = resp.json().await.expect("Failed to parse product");
    let id = created["id"].as_i64().expect("Product id missing");

    // A regular user cannot update or delete
    let resp = client
        .patch(format!("{base_url}/api/products/update-product/{id}"))
        .json(&json!({ "price": "1.00" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .delete(format!("{base_url}/api/products/{id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
