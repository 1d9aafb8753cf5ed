//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use thimble_core::{OrderId, OrderItemId, OrderStatus, ProductId};

/// A confirmed order (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Payment processor's payment-intent id. Unique; confirming the same
    /// checkout session twice refreshes the existing order.
    pub payment_ref: String,
    /// Order total.
    pub amount: Decimal,
    /// Shopper email reported by the payment processor.
    pub email: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Purchased line items.
    pub items: Vec<OrderItem>,
    /// When the order was recorded.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A purchased line item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    /// Catalog product, when the checkout payload identified one.
    pub product_id: Option<ProductId>,
    pub quantity: i32,
    /// Price per unit at purchase time.
    pub unit_price: Decimal,
    /// Selected size, if any.
    pub size: Option<String>,
}
