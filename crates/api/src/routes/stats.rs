//! Dashboard statistics routes.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::db::stats::StatsRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::state::AppState;

use thimble_core::Email;

/// Dashboard figures for one shopper, looked up by email.
pub async fn user_stats(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let email =
        Email::parse(&email).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let stats = StatsRepository::new(state.pool())
        .user_stats(user.id, email.as_str())
        .await?;

    Ok(Json(json!({
        "totalPayments": stats.total_payments,
        "totalReviews": stats.total_reviews,
        "totalPurchasedProducts": stats.total_purchased_products,
    })))
}

/// Site-wide dashboard figures. Admin only.
pub async fn admin_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let stats = StatsRepository::new(state.pool()).admin_stats().await?;

    let monthly: Vec<serde_json::Value> = stats
        .monthly_earnings
        .iter()
        .map(|m| {
            json!({
                "month": m.month,
                "year": m.year,
                "earnings": m.earnings,
            })
        })
        .collect();

    Ok(Json(json!({
        "totalOrders": stats.total_orders,
        "totalProducts": stats.total_products,
        "totalReviews": stats.total_reviews,
        "totalUsers": stats.total_users,
        "totalEarnings": stats.total_earnings,
        "monthlyEarnings": monthly,
    })))
}
