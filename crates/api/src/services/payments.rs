//! Payment processor API client for hosted checkout sessions.
//!
//! Creates checkout sessions for the cart and retrieves them after redirect
//! so the order can be recorded with its final payment status.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PaymentsConfig;

/// Payment processor API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when interacting with the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A cart line could not be converted to minor currency units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One cart line submitted for checkout.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// A checkout session as returned by the processor.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Session total in minor currency units.
    pub amount_total: Option<i64>,
    pub payment_intent: Option<PaymentIntent>,
    pub customer_details: Option<CustomerDetails>,
    pub line_items: Option<LineItemList>,
}

/// The payment attempt behind a session.
#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Processor status string, e.g. "succeeded".
    pub status: String,
}

/// Shopper details collected during checkout.
#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

/// Expanded line items of a session.
#[derive(Debug, Deserialize)]
pub struct LineItemList {
    pub data: Vec<SessionLineItem>,
}

/// One purchased line of a session.
#[derive(Debug, Deserialize)]
pub struct SessionLineItem {
    pub quantity: Option<i64>,
    pub price: Option<PriceData>,
}

/// Price attached to a session line.
#[derive(Debug, Deserialize)]
pub struct PriceData {
    /// Unit price in minor currency units.
    pub unit_amount: Option<i64>,
}

/// Payment processor API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    success_url: String,
    cancel_url: String,
    currency: String,
}

impl PaymentClient {
    /// Create a new payment processor client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
            currency: config.currency.clone(),
        })
    }

    /// Create a hosted checkout session for the given cart lines.
    ///
    /// # Errors
    ///
    /// Returns error if a line's price cannot be expressed in minor units or
    /// the API request fails.
    pub async fn create_checkout_session(
        &self,
        lines: &[CheckoutLine],
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{BASE_URL}/checkout/sessions");

        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (i, line) in lines.iter().enumerate() {
            let unit_amount = to_minor_units(line.unit_price)
                .ok_or_else(|| PaymentError::InvalidAmount(line.unit_price.to_string()))?;
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                self.currency.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                line.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
        }

        let response = self.client.post(&url).form(&form).send().await?;
        Self::parse_session(response).await
    }

    /// Retrieve a checkout session with its line items, payment intent, and
    /// customer details expanded.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{BASE_URL}/checkout/sessions/{session_id}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("expand[]", "line_items"),
                ("expand[]", "payment_intent"),
                ("expand[]", "customer_details"),
            ])
            .send()
            .await?;
        Self::parse_session(response).await
    }

    async fn parse_session(response: reqwest::Response) -> Result<CheckoutSession, PaymentError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

/// Convert a decimal price to minor currency units (cents).
fn to_minor_units(price: Decimal) -> Option<i64> {
    (price * Decimal::from(100)).round().to_i64()
}

/// Convert minor currency units back to a two-decimal amount.
pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn minor_units_roundtrip() {
        let price = Decimal::from_str("19.99").unwrap();
        assert_eq!(to_minor_units(price), Some(1999));
        assert_eq!(from_minor_units(1999), price);
    }

    #[test]
    fn fractional_cents_round_to_nearest() {
        let price = Decimal::from_str("0.005").unwrap();
        // Banker's rounding lands on the even cent.
        assert_eq!(to_minor_units(price), Some(0));
        let price = Decimal::from_str("0.015").unwrap();
        assert_eq!(to_minor_units(price), Some(2));
    }
}
