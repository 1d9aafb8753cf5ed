//! Contact form routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::db::contacts::ContactRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

/// Request body for a contact form submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Record a contact form submission.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, and message are required".to_string(),
        ));
    }

    let submission = ContactRepository::new(state.pool())
        .create(req.name.trim(), req.email.trim(), req.message.trim())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "contact": submission,
        })),
    ))
}

/// List all contact form submissions. Admin only.
pub async fn list_contacts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let messages = ContactRepository::new(state.pool()).list_all().await?;
    Ok(Json(messages))
}
