//! Image upload route.

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// Upload an image to the media host and return its hosted URL.
///
/// Accepts a multipart form with a single `image` file field.
#[instrument(skip(state, multipart), fields(user_id = %auth.user_id))]
pub async fn upload_image(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.jpg").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Image file is empty".to_string()));
        }

        let url = state
            .media()
            .upload_image(bytes.to_vec(), &filename, &content_type)
            .await?;

        tracing::info!("Image uploaded");

        return Ok(Json(json!({ "url": url })));
    }

    Err(AppError::BadRequest(
        "Missing 'image' file field".to_string(),
    ))
}
