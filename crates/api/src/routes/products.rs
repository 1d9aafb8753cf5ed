//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use thimble_core::ProductId;

use crate::db::products::{NewProduct, ProductFilter, ProductRepository, ProductUpdate};
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::state::AppState;

/// Default page size for catalog listings.
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub image: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// Request body for updating a product. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub old_price: Option<Decimal>,
    pub image: Option<String>,
    pub color: Option<String>,
    pub sizes: Option<Vec<String>>,
}

/// Catalog listing query parameters.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Treat missing and "all" filter values as no constraint.
fn normalize_filter(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}

/// Create a new catalog product. Requires a signed-in user.
pub async fn create_product(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name: req.name,
            category: req.category,
            description: req.description,
            price: req.price,
            old_price: req.old_price,
            image: req.image,
            color: req.color,
            sizes: req.sizes,
            author_id: auth.user_id,
        })
        .await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// List products with optional filters and pagination.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let filter = ProductFilter {
        category: normalize_filter(query.category),
        color: normalize_filter(query.color),
        min_price: query.min_price,
        max_price: query.max_price,
    };
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let result = ProductRepository::new(state.pool())
        .list(&filter, page, limit)
        .await?;

    let total_pages = (result.total_products as u64).div_ceil(limit as u64);
    Ok(Json(json!({
        "products": result.products,
        "totalProducts": result.total_products,
        "totalPages": total_pages,
    })))
}

/// Products related to the given one by name or category.
pub async fn related_products(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).related(id).await?;
    Ok(Json(products))
}

/// A single product with its author and reviews.
pub async fn single_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_with_author(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    Ok(Json(json!({
        "product": product,
        "reviews": reviews,
    })))
}

/// Update a product. Admin only.
pub async fn update_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .update(
            id,
            ProductUpdate {
                name: req.name,
                category: req.category,
                description: req.description,
                price: req.price,
                old_price: req.old_price,
                image: req.image,
                color: req.color,
                sizes: req.sizes,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": product,
    })))
}

/// Delete a product and its reviews. Admin only.
pub async fn delete_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::normalize_filter;

    #[test]
    fn all_and_empty_filters_are_dropped() {
        assert_eq!(normalize_filter(Some("all".to_string())), None);
        assert_eq!(normalize_filter(Some(String::new())), None);
        assert_eq!(normalize_filter(None), None);
        assert_eq!(
            normalize_filter(Some("dresses".to_string())).as_deref(),
            Some("dresses")
        );
    }
}
