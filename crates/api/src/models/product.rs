//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use thimble_core::{Email, ProductId, UserId};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Catalog category (e.g. "dresses").
    pub category: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
    /// Current price.
    pub price: Decimal,
    /// Pre-discount price, when the product is on sale.
    pub old_price: Option<Decimal>,
    /// Hosted product image URL.
    pub image: Option<String>,
    /// Primary color.
    pub color: Option<String>,
    /// Average review rating, one decimal place. Zero until reviewed.
    pub rating: Decimal,
    /// Available sizes.
    pub sizes: Vec<String>,
    /// User who created the product.
    pub author_id: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// The product author's public identity, joined for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAuthor {
    pub email: Email,
    pub username: String,
}

/// A product together with its author.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithAuthor {
    #[serde(flatten)]
    pub product: Product,
    pub author: ProductAuthor,
}
