//! Aggregate statistics queries for dashboards.

use rust_decimal::Decimal;
use sqlx::PgPool;

use thimble_core::UserId;

use crate::db::RepositoryError;

/// Per-shopper dashboard figures.
#[derive(Debug)]
pub struct UserStats {
    /// Sum of the user's order totals, two decimal places.
    pub total_payments: Decimal,
    /// Reviews the user has posted.
    pub total_reviews: i64,
    /// Distinct catalog products the user has purchased.
    pub total_purchased_products: i64,
}

/// Site-wide dashboard figures.
#[derive(Debug)]
pub struct AdminStats {
    pub total_orders: i64,
    pub total_products: i64,
    pub total_reviews: i64,
    pub total_users: i64,
    /// Sum of all order totals, two decimal places.
    pub total_earnings: Decimal,
    /// Earnings grouped by calendar month, oldest first.
    pub monthly_earnings: Vec<MonthlyEarnings>,
}

/// Earnings for one calendar month.
#[derive(Debug, sqlx::FromRow)]
pub struct MonthlyEarnings {
    pub month: i32,
    pub year: i32,
    pub earnings: Decimal,
}

/// Repository for aggregate statistics.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Figures for one shopper, keyed by their account id and order email.
    pub async fn user_stats(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<UserStats, RepositoryError> {
        let total_payments: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(ROUND(SUM(amount), 2), 0) FROM orders WHERE email = $1",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        let total_reviews: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        let total_purchased_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT oi.product_id) \
             FROM order_items oi \
             JOIN orders o ON o.id = oi.order_id \
             WHERE o.email = $1 AND oi.product_id IS NOT NULL",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(UserStats {
            total_payments,
            total_reviews,
            total_purchased_products,
        })
    }

    /// Site-wide figures for the admin dashboard.
    pub async fn admin_stats(&self) -> Result<AdminStats, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        let total_reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(self.pool)
            .await?;
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        let total_earnings: Decimal =
            sqlx::query_scalar("SELECT COALESCE(ROUND(SUM(amount), 2), 0) FROM orders")
                .fetch_one(self.pool)
                .await?;

        let monthly_earnings = sqlx::query_as::<_, MonthlyEarnings>(
            "SELECT \
                EXTRACT(MONTH FROM created_at)::int AS month, \
                EXTRACT(YEAR FROM created_at)::int AS year, \
                ROUND(SUM(amount), 2) AS earnings \
             FROM orders \
             GROUP BY year, month \
             ORDER BY year, month",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(AdminStats {
            total_orders,
            total_products,
            total_reviews,
            total_users,
            total_earnings,
            monthly_earnings,
        })
    }
}
