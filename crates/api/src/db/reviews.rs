//! Product review queries.

use sqlx::PgPool;

use thimble_core::{Email, ProductId, ReviewId, UserId};

use crate::db::RepositoryError;
use crate::models::{Review, ReviewAuthor, ReviewWithAuthor};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    comment: String,
    rating: i16,
    user_id: UserId,
    product_id: ProductId,
    image: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            comment: row.comment,
            rating: row.rating,
            user_id: row.user_id,
            product_id: row.product_id,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewWithAuthorRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    author_username: String,
    author_email: String,
}

impl TryFrom<ReviewWithAuthorRow> for ReviewWithAuthor {
    type Error = RepositoryError;

    fn try_from(row: ReviewWithAuthorRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.author_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in users table: {e}"))
        })?;
        Ok(ReviewWithAuthor {
            review: row.review.into(),
            user: ReviewAuthor {
                username: row.author_username,
                email,
            },
        })
    }
}

const REVIEW_COLUMNS: &str =
    "r.id, r.comment, r.rating, r.user_id, r.product_id, r.image, r.created_at, r.updated_at";

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review, or replace the user's existing review of the product.
    /// Replacement is total: a repost without an image clears the old one.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        comment: &str,
        rating: i16,
        image: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let sql = format!(
            "INSERT INTO reviews (user_id, product_id, comment, rating, image) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, product_id) DO UPDATE SET \
                comment = EXCLUDED.comment, \
                rating = EXCLUDED.rating, \
                image = EXCLUDED.image, \
                updated_at = NOW() \
             RETURNING {}",
            REVIEW_COLUMNS.replace("r.", "")
        );
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(comment)
            .bind(rating)
            .bind(image)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// All reviews of a product with their authors, newest first.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS}, u.username AS author_username, u.email AS author_email \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.product_id = $1 \
             ORDER BY r.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ReviewWithAuthorRow>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(ReviewWithAuthor::try_from).collect()
    }

}
