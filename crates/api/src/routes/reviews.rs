//! Product review routes.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use thimble_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// Maximum review comment length, matching the column constraint.
const MAX_COMMENT_LENGTH: usize = 200;

/// Parsed multipart fields of a review submission.
#[derive(Debug, Default)]
struct ReviewForm {
    comment: Option<String>,
    rating: Option<i16>,
    product_id: Option<ProductId>,
    image: Option<(Vec<u8>, String, String)>,
}

async fn parse_review_form(mut multipart: Multipart) -> Result<ReviewForm> {
    let mut form = ReviewForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "comment" => {
                form.comment = Some(read_text(field).await?);
            }
            "rating" => {
                let text = read_text(field).await?;
                let rating = text
                    .parse::<i16>()
                    .map_err(|_| AppError::BadRequest("Invalid rating".to_string()))?;
                form.rating = Some(rating);
            }
            "productId" => {
                let text = read_text(field).await?;
                let id = text
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest("Invalid product id".to_string()))?;
                form.product_id = Some(ProductId::new(id));
            }
            "image" => {
                let filename = field.file_name().unwrap_or("review.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {e}")))?;
                form.image = Some((bytes.to_vec(), filename, content_type));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {e}")))
}

/// Post or update a review for a product.
///
/// Accepts a multipart form with `comment`, `rating`, `productId`, and an
/// optional `image` file. A user's second review of the same product replaces
/// the first. The product's average rating is recomputed afterwards.
#[instrument(skip(state, multipart), fields(user_id = %auth.user_id))]
pub async fn post_review(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = parse_review_form(multipart).await?;

    let comment = form
        .comment
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Comment is required".to_string()))?;
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Comment must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    let rating = form
        .rating
        .ok_or_else(|| AppError::BadRequest("Rating is required".to_string()))?;
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    let product_id = form
        .product_id
        .ok_or_else(|| AppError::BadRequest("Product id is required".to_string()))?;

    let products = ProductRepository::new(state.pool());
    if products.get(product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let image_url = match form.image {
        Some((bytes, filename, content_type)) if !bytes.is_empty() => Some(
            state
                .media()
                .upload_image(bytes, &filename, &content_type)
                .await?,
        ),
        _ => None,
    };

    let review = ReviewRepository::new(state.pool())
        .upsert(auth.user_id, product_id, &comment, rating, image_url.as_deref())
        .await?;
    let rating = products.recompute_rating(product_id).await?;

    tracing::info!(review_id = %review.id, product_id = %product_id, "Review posted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review posted successfully",
            "review": review,
            "productRating": rating,
        })),
    ))
}
