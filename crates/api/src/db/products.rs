//! Product catalog queries.

use rust_decimal::Decimal;
use sqlx::PgPool;

use thimble_core::{Email, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{Product, ProductAuthor, ProductWithAuthor};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: Option<String>,
    description: Option<String>,
    price: Decimal,
    old_price: Option<Decimal>,
    image: Option<String>,
    color: Option<String>,
    rating: Decimal,
    sizes: Vec<String>,
    author_id: UserId,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            price: row.price,
            old_price: row.old_price,
            image: row.image,
            color: row.color,
            rating: row.rating,
            sizes: row.sizes,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductWithAuthorRow {
    #[sqlx(flatten)]
    product: ProductRow,
    author_email: String,
    author_username: String,
}

impl TryFrom<ProductWithAuthorRow> for ProductWithAuthor {
    type Error = RepositoryError;

    fn try_from(row: ProductWithAuthorRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.author_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in users table: {e}"))
        })?;
        Ok(ProductWithAuthor {
            product: row.product.into(),
            author: ProductAuthor {
                email,
                username: row.author_username,
            },
        })
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.category, p.description, p.price, p.old_price, \
     p.image, p.color, p.rating, p.sizes, p.author_id, p.created_at";

/// Fields for inserting a new product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub image: Option<String>,
    pub color: Option<String>,
    pub sizes: Vec<String>,
    pub author_id: UserId,
}

/// Partial update for an existing product. `None` fields keep their value.
#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub old_price: Option<Decimal>,
    pub image: Option<String>,
    pub color: Option<String>,
    pub sizes: Option<Vec<String>>,
}

/// Catalog listing filters. `None` means "no constraint".
#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// One page of catalog results.
#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_products: i64,
}

/// Build a case-insensitive alternation pattern from a product name, keeping
/// only words longer than two characters. Returns `None` when no word
/// qualifies.
fn name_pattern(name: &str) -> Option<String> {
    let words: Vec<String> = name
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("|"))
    }
}

/// Repository for product catalog operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product.
    pub async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products \
                (name, category, description, price, old_price, image, color, sizes, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            PRODUCT_COLUMNS.replace("p.", "")
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(new.name)
            .bind(new.category)
            .bind(new.description)
            .bind(new.price)
            .bind(new.old_price)
            .bind(new.image)
            .bind(new.color)
            .bind(new.sizes)
            .bind(new.author_id)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// Recompute a product's average rating from its reviews and persist it,
    /// rounded to one decimal place. Returns the new rating.
    pub async fn recompute_rating(&self, id: ProductId) -> Result<Decimal, RepositoryError> {
        let rating: Decimal = sqlx::query_scalar(
            "UPDATE products SET rating = ( \
                SELECT COALESCE(ROUND(AVG(rating)::numeric, 1), 0) \
                FROM reviews WHERE product_id = $1 \
             ) \
             WHERE id = $1 \
             RETURNING rating",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(rating)
    }

    /// List products matching the filter, newest first, paginated.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, RepositoryError> {
        const WHERE_CLAUSE: &str = "($1::text IS NULL OR category = $1) \
             AND ($2::text IS NULL OR color = $2) \
             AND ($3::numeric IS NULL OR price >= $3) \
             AND ($4::numeric IS NULL OR price <= $4)";

        let total_products: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {WHERE_CLAUSE}"))
                .bind(&filter.category)
                .bind(&filter.color)
                .bind(filter.min_price)
                .bind(filter.max_price)
                .fetch_one(self.pool)
                .await?;

        let offset = (page.max(1) - 1) * limit;
        let sql = format!(
            "SELECT {} FROM products p WHERE {WHERE_CLAUSE} \
             ORDER BY p.created_at DESC LIMIT $5 OFFSET $6",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&filter.category)
            .bind(&filter.color)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(ProductPage {
            products: rows.into_iter().map(Product::from).collect(),
            total_products,
        })
    }

    /// Up to six products related to the given one, by shared name words or
    /// same category. The product itself is excluded.
    pub async fn related(&self, id: ProductId) -> Result<Vec<Product>, RepositoryError> {
        let product = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        let pattern = name_pattern(&product.name);

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p \
             WHERE p.id <> $1 \
               AND (($2::text IS NOT NULL AND p.name ~* $2) OR p.category = $3) \
             ORDER BY p.created_at DESC \
             LIMIT 6"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(pattern)
            .bind(product.category)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Fetch a single product.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    /// Fetch a single product joined with its author.
    pub async fn get_with_author(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithAuthor>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}, u.email AS author_email, u.username AS author_username \
             FROM products p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, ProductWithAuthorRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(ProductWithAuthor::try_from).transpose()
    }

    /// Apply a partial update. Unset fields keep their current value.
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products p SET \
                name = COALESCE($2, name), \
                category = COALESCE($3, category), \
                description = COALESCE($4, description), \
                price = COALESCE($5, price), \
                old_price = COALESCE($6, old_price), \
                image = COALESCE($7, image), \
                color = COALESCE($8, color), \
                sizes = COALESCE($9, sizes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.category)
            .bind(update.description)
            .bind(update.price)
            .bind(update.old_price)
            .bind(update.image)
            .bind(update.color)
            .bind(update.sizes)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a product; its reviews cascade. Returns `true` if a row was
    /// removed.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::name_pattern;

    #[test]
    fn name_pattern_skips_short_words() {
        assert_eq!(
            name_pattern("Red Silk Tie").as_deref(),
            Some("Red|Silk|Tie")
        );
        assert_eq!(name_pattern("A to Z").as_deref(), None);
        assert_eq!(
            name_pattern("An Oversized Hoodie").as_deref(),
            Some("Oversized|Hoodie")
        );
    }

    #[test]
    fn name_pattern_escapes_regex_metacharacters() {
        assert_eq!(
            name_pattern("Tee (v2)").as_deref(),
            Some("Tee|\\(v2\\)")
        );
    }
}
