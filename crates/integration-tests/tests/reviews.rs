//! Integration tests for posting product reviews.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p thimble-api)
//!
//! Reviews with image attachments are excluded; they require live media
//! hosting credentials.
//!
//! Run with: cargo test -p thimble-integration-tests -- --ignored

use reqwest::{StatusCode, multipart};
use serde_json::{Value, json};

use thimble_integration_tests::{api_base_url, cookie_client, unique_email};

const TEST_PASSWORD: &str = "integration-test-pw-1";

async fn signed_in_client() -> reqwest::Client {
    let client = cookie_client();
    let base_url = api_base_url();
    let email = unique_email("reviews");

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "username": "Review Tester",
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

async fn create_product(client: &reqwest::Client, name: &str) -> i64 {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/api/products/create-product"))
        .json(&json!({ "name": name, "price": "12.00" }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    created["id"].as_i64().expect("Product id missing")
}

fn review_form(comment: &str, rating: &str, product_id: i64) -> multipart::Form {
    multipart::Form::new()
        .text("comment", comment.to_string())
        .text("rating", rating.to_string())
        .text("productId", product_id.to_string())
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_repost_replaces_review_and_rating() {
    let client = signed_in_client().await;
    let base_url = api_base_url();
    let product_id = create_product(&client, "Reviewed Ceramic Mug").await;

    let resp = client
        .post(format!("{base_url}/api/reviews/post-review"))
        .multipart(review_form("Lovely glaze", "5", product_id))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse review response");
    assert_eq!(body["review"]["comment"], "Lovely glaze");
    assert_eq!(body["productRating"], "5.0");

    // Reposting replaces the review in full, image included
    let resp = client
        .post(format!("{base_url}/api/reviews/post-review"))
        .multipart(review_form("Chipped after a week", "3", product_id))
        .send()
        .await
        .expect("Failed to repost review");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse review response");
    assert_eq!(body["review"]["comment"], "Chipped after a week");
    assert!(body["review"]["image"].is_null());
    assert_eq!(body["productRating"], "3.0");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_review_validation() {
    let client = signed_in_client().await;
    let base_url = api_base_url();
    let product_id = create_product(&client, "Validated Wool Scarf").await;

    // Rating outside 1..=5 is rejected
    let resp = client
        .post(format!("{base_url}/api/reviews/post-review"))
        .multipart(review_form("Too enthusiastic", "6", product_id))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // An empty comment is rejected
    let resp = client
        .post(format!("{base_url}/api/reviews/post-review"))
        .multipart(review_form("   ", "4", product_id))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // An unknown product is a 404
    let resp = client
        .post(format!("{base_url}/api/reviews/post-review"))
        .multipart(review_form("Ghost product", "4", 0))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
