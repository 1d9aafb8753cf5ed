//! Review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use thimble_core::{Email, ProductId, ReviewId, UserId};

/// A product review (domain type).
///
/// Each user has at most one review per product; reposting replaces the
/// previous comment, rating, and image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Review text, at most 200 characters.
    pub comment: String,
    /// Star rating, 1 through 5.
    pub rating: i16,
    /// Reviewer.
    pub user_id: UserId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Hosted review photo URL, if one was attached.
    pub image: Option<String>,
    /// When the review was first posted.
    pub created_at: DateTime<Utc>,
    /// When the review was last edited.
    pub updated_at: DateTime<Utc>,
}

/// The reviewer's public identity, joined for product pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub username: String,
    pub email: Email,
}

/// A review together with its author.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub user: ReviewAuthor,
}
