//! Checkout and order management routes.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use thimble_core::{Email, OrderId, OrderStatus, ProductId};

use crate::db::orders::{NewOrderItem, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::services::payments::{CheckoutLine, CustomerDetails, LineItemList, from_minor_units};
use crate::state::AppState;

/// Recorded when the processor reports no shopper email for a session.
const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// One cart line submitted for checkout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub product_id: Option<ProductId>,
    pub size: Option<String>,
}

/// Request body for creating a checkout session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub products: Vec<CartItem>,
}

/// Request body for confirming a payment after redirect.
///
/// The cart is resubmitted alongside the session id because the processor's
/// line items carry no catalog linkage; `products` is what ties the stored
/// order items back to product ids and sizes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
    #[serde(default)]
    pub products: Vec<CartItem>,
}

/// Request body for changing an order's status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: Option<OrderStatus>,
}

/// Checkout lines for the processor. The selected size is folded into the
/// display name; the processor has no field for it.
fn checkout_lines(cart: &[CartItem]) -> Vec<CheckoutLine> {
    cart.iter()
        .map(|item| CheckoutLine {
            name: match &item.size {
                Some(size) => format!("{} ({size})", item.name),
                None => item.name.clone(),
            },
            unit_price: item.price,
            quantity: item.quantity,
        })
        .collect()
}

/// Line items to record for a new order. The resubmitted cart wins because it
/// carries catalog ids and sizes; the processor's line items are a fallback
/// for clients that confirm with the session id alone.
fn order_items(cart: &[CartItem], session_lines: Option<LineItemList>) -> Vec<NewOrderItem> {
    if !cart.is_empty() {
        return cart
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: i32::try_from(item.quantity).unwrap_or(1),
                unit_price: item.price,
                size: item.size.clone(),
            })
            .collect();
    }

    session_lines
        .map(|list| {
            list.data
                .into_iter()
                .map(|line| NewOrderItem {
                    product_id: None,
                    quantity: i32::try_from(line.quantity.unwrap_or(1)).unwrap_or(1),
                    unit_price: from_minor_units(line.price.and_then(|p| p.unit_amount).unwrap_or(0)),
                    size: None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Normalized email to store on the order, so later lookups (which parse and
/// lowercase their input) match what was recorded.
fn order_email(details: Option<CustomerDetails>) -> String {
    details
        .and_then(|d| d.email)
        .and_then(|e| Email::parse(&e).ok())
        .map_or_else(|| UNKNOWN_EMAIL.to_string(), |e| e.as_str().to_string())
}

/// Create a hosted checkout session for the cart. Returns the session id for
/// the client-side redirect.
#[instrument(skip(state, req), fields(lines = req.products.len()))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(req): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse> {
    if req.products.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let lines = checkout_lines(&req.products);
    let session = state.payments().create_checkout_session(&lines).await?;

    tracing::info!(session_id = %session.id, "Checkout session created");

    Ok(Json(json!({ "id": session.id })))
}

/// Confirm a checkout session after redirect and record the order.
///
/// Retrieves the session from the processor; a session confirmed twice
/// refreshes the stored order's status instead of duplicating it. Payments
/// that did not succeed are recorded as failed.
#[instrument(skip(state, req))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse> {
    let session = state
        .payments()
        .retrieve_checkout_session(&req.session_id)
        .await?;

    let intent = session
        .payment_intent
        .ok_or_else(|| AppError::BadRequest("Checkout session has no payment".to_string()))?;
    let status = if intent.status == "succeeded" {
        OrderStatus::Pending
    } else {
        OrderStatus::Failed
    };
    let amount = from_minor_units(session.amount_total.unwrap_or(0));
    let email = order_email(session.customer_details);

    let orders = OrderRepository::new(state.pool());
    let order = match orders.find_by_payment_ref(&intent.id).await? {
        Some(_) => orders.update_status_by_payment_ref(&intent.id, status).await?,
        None => {
            let items = order_items(&req.products, session.line_items);
            orders
                .create_with_items(&intent.id, amount, &email, status, items)
                .await?
        }
    };

    tracing::info!(order_id = %order.id, status = %order.status, "Payment confirmed");

    Ok(Json(json!({
        "message": "Order confirmed",
        "order": order,
    })))
}

/// All orders placed under an email. 404 when there are none.
pub async fn orders_by_email(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    // Orders store normalized emails; normalize the lookup the same way.
    let email =
        Email::parse(&email).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let orders = OrderRepository::new(state.pool())
        .find_by_email(email.as_str())
        .await?;
    if orders.is_empty() {
        return Err(AppError::NotFound(
            "No orders found for this email".to_string(),
        ));
    }
    Ok(Json(orders))
}

/// A single order by id.
pub async fn order_by_id(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

/// All orders. Admin only.
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// Change an order's status. Admin only.
pub async fn update_order_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse> {
    let status = req
        .status
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?;
    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?;
    Ok(Json(json!({
        "message": "Order status updated successfully",
        "order": order,
    })))
}

/// Delete an order. Admin only.
pub async fn delete_order(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let deleted = OrderRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Order not found".to_string()));
    }
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payments::{PriceData, SessionLineItem};

    fn cart_item(product_id: Option<i32>, size: Option<&str>) -> CartItem {
        CartItem {
            name: "Everyday Cotton Tee".to_string(),
            price: Decimal::new(1999, 2),
            quantity: 2,
            product_id: product_id.map(ProductId::new),
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn cart_items_keep_catalog_linkage() {
        let items = order_items(&[cart_item(Some(7), Some("M"))], None);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, Some(ProductId::new(7)));
        assert_eq!(items[0].size.as_deref(), Some("M"));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, Decimal::new(1999, 2));
    }

    #[test]
    fn session_lines_are_fallback_only() {
        let lines = LineItemList {
            data: vec![SessionLineItem {
                quantity: Some(3),
                price: Some(PriceData {
                    unit_amount: Some(500),
                }),
            }],
        };

        // A resubmitted cart takes precedence over the processor's lines
        let items = order_items(&[cart_item(Some(4), None)], Some(lines));
        assert_eq!(items[0].product_id, Some(ProductId::new(4)));

        let lines = LineItemList {
            data: vec![SessionLineItem {
                quantity: Some(3),
                price: Some(PriceData {
                    unit_amount: Some(500),
                }),
            }],
        };
        let items = order_items(&[], Some(lines));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, None);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price, Decimal::new(500, 2));
    }

    #[test]
    fn checkout_lines_fold_size_into_name() {
        let lines = checkout_lines(&[cart_item(None, Some("M")), cart_item(None, None)]);
        assert_eq!(lines[0].name, "Everyday Cotton Tee (M)");
        assert_eq!(lines[1].name, "Everyday Cotton Tee");
    }

    #[test]
    fn order_email_is_normalized_with_fallback() {
        let details = CustomerDetails {
            email: Some("  Buyer@Example.COM ".to_string()),
        };
        assert_eq!(order_email(Some(details)), "buyer@example.com");

        assert_eq!(order_email(None), UNKNOWN_EMAIL);
        assert_eq!(order_email(Some(CustomerDetails { email: None })), UNKNOWN_EMAIL);
        assert_eq!(
            order_email(Some(CustomerDetails {
                email: Some("not-an-address".to_string()),
            })),
            UNKNOWN_EMAIL
        );
    }
}
