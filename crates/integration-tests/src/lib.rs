//! Integration tests for Thimble.
//!
//! # Running Tests
//!
//! ```bash
//! # Run migrations against a local database
//! cargo run -p thimble-cli -- migrate
//!
//! # Start the API server
//! cargo run -p thimble-api
//!
//! # Run integration tests
//! cargo test -p thimble-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, and session cookie tests
//! - `products` - Catalog listing and filtering tests
//! - `orders` - Order listing and admin access tests
//!
//! Tests that call payment or media hosting endpoints are excluded; those
//! require live third-party credentials.

use std::sync::atomic::{AtomicU16, Ordering};

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};

static NEXT_CLIENT: AtomicU16 = AtomicU16::new(0);

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Create an HTTP client with a cookie store, so the session cookie set by
/// login is carried on later requests.
///
/// Each client advertises a distinct `X-Forwarded-For` address so the
/// per-IP rate limiter on auth endpoints does not throttle parallel tests
/// all arriving from loopback.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn cookie_client() -> Client {
    let n = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    let forwarded = format!("10.{}.{}.{}", pid % 256, n / 256, n % 256);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&forwarded).expect("forwarded address is a valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email per test run, to avoid collisions on re-runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let pid = std::process::id();
    format!("{prefix}-{pid}-{nanos}@example.com")
}
