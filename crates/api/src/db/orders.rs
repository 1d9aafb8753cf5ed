//! Order and order line item queries.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use thimble_core::{OrderId, OrderItemId, OrderStatus, ProductId};

use crate::db::RepositoryError;
use crate::models::{Order, OrderItem};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    payment_ref: String,
    amount: Decimal,
    email: String,
    status: OrderStatus,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            payment_ref: self.payment_ref,
            amount: self.amount,
            email: self.email,
            status: self.status,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: Option<ProductId>,
    quantity: i32,
    unit_price: Decimal,
    size: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            size: row.size,
        }
    }
}

const ORDER_COLUMNS: &str = "id, payment_ref, amount, email, status, created_at, updated_at";

/// A line item to record when confirming a checkout session.
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_id: Option<ProductId>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub size: Option<String>,
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an order by the payment processor's payment-intent id.
    pub async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE payment_ref = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(payment_ref)
            .fetch_optional(self.pool)
            .await?;
        match row {
            Some(row) => {
                let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Record a confirmed order with its line items in one transaction.
    pub async fn create_with_items(
        &self,
        payment_ref: &str,
        amount: Decimal,
        email: &str,
        status: OrderStatus,
        items: Vec<NewOrderItem>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders (payment_ref, amount, email, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order_row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(payment_ref)
            .bind(amount)
            .bind(email)
            .bind(status)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_unique_violation(e, "order"))?;

        let mut recorded = Vec::with_capacity(items.len());
        for item in items {
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price, size) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, order_id, product_id, quantity, unit_price, size",
            )
            .bind(order_row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.size)
            .fetch_one(&mut *tx)
            .await?;
            recorded.push(item_row.into());
        }

        tx.commit().await?;
        Ok(order_row.into_order(recorded))
    }

    /// Refresh the status of an order identified by its payment reference.
    pub async fn update_status_by_payment_ref(
        &self,
        payment_ref: &str,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() \
             WHERE payment_ref = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(payment_ref)
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(row.into_order(items))
    }

    /// All orders placed under an email, newest first.
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE email = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(email)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// Fetch a single order with its items.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        match row {
            Some(row) => {
                let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// All orders, newest first.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// Change an order's lifecycle status.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(row.into_order(items))
    }

    /// Delete an order; its items cascade. Returns `true` if a row was
    /// removed.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut by_order = self.items_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    async fn items_for(
        &self,
        order_ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<i32> = order_ids.iter().map(|id| i32::from(*id)).collect();
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, unit_price, size \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_id).or_default().push(row.into());
        }
        Ok(by_order)
    }
}
