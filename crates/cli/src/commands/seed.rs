//! Database seeding command.
//!
//! Inserts a small sample catalog for local development. Idempotent: products
//! are keyed by name and skipped when already present.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CommandError, connect};

struct SampleProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price: Decimal,
    color: &'static str,
    sizes: &'static [&'static str],
}

fn sample_products() -> Vec<SampleProduct> {
    vec![
        SampleProduct {
            name: "Linen Wrap Dress",
            category: "dresses",
            description: "Breathable linen wrap dress for warm days.",
            price: Decimal::new(5999, 2),
            color: "beige",
            sizes: &["S", "M", "L"],
        },
        SampleProduct {
            name: "Everyday Cotton Tee",
            category: "tops",
            description: "Soft mid-weight cotton tee with a relaxed fit.",
            price: Decimal::new(1999, 2),
            color: "white",
            sizes: &["XS", "S", "M", "L", "XL"],
        },
        SampleProduct {
            name: "High-Rise Denim Jeans",
            category: "bottoms",
            description: "Classic high-rise jeans in rigid denim.",
            price: Decimal::new(7499, 2),
            color: "blue",
            sizes: &["26", "28", "30", "32"],
        },
        SampleProduct {
            name: "Wool Blend Overcoat",
            category: "outerwear",
            description: "Tailored overcoat in a warm wool blend.",
            price: Decimal::new(18900, 2),
            color: "charcoal",
            sizes: &["S", "M", "L"],
        },
    ]
}

/// Seed the database with sample catalog data.
///
/// Requires at least one existing user to own the products; run
/// `thimble-cli admin create` first on an empty database.
///
/// # Errors
///
/// Returns an error if no user exists or a database operation fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let author_id: i32 = sqlx::query_scalar("SELECT id FROM users ORDER BY id LIMIT 1")
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            CommandError::InvalidInput(
                "no users exist; create one first with 'thimble-cli admin create'".to_string(),
            )
        })?;

    let mut inserted = 0u32;
    for product in sample_products() {
        if insert_if_missing(&pool, &product, author_id).await? {
            inserted += 1;
        }
    }

    tracing::info!("Seed complete: {inserted} products inserted");
    Ok(())
}

async fn insert_if_missing(
    pool: &PgPool,
    product: &SampleProduct,
    author_id: i32,
) -> Result<bool, CommandError> {
    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
        .bind(product.name)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        tracing::debug!("Skipping existing product: {}", product.name);
        return Ok(false);
    }

    let sizes: Vec<String> = product.sizes.iter().map(ToString::to_string).collect();
    sqlx::query(
        "INSERT INTO products (name, category, description, price, color, sizes, author_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(product.name)
    .bind(product.category)
    .bind(product.description)
    .bind(product.price)
    .bind(product.color)
    .bind(&sizes)
    .bind(author_id)
    .execute(pool)
    .await?;

    tracing::info!("Inserted product: {}", product.name);
    Ok(true)
}
