//! Authentication and user management routes.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use thimble_core::{Email, UserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    RequireAdmin, RequireAuth, clear_session_cookie, session_cookie,
};
use crate::models::Address;
use crate::services::auth::{AuthService, TOKEN_TTL_SECS, issue_token};
use crate::state::AppState;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for changing a user's role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Request body for editing the caller's profile.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileRequest {
    pub username: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub profession: Option<String>,
    pub address: Option<Address>,
}

/// Register a new user account.
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool());
    let user = service
        .register(&req.username, &req.email, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful",
            "user": user,
        })),
    ))
}

/// Login with email and password. Sets the session cookie.
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool());
    let user = service.login(&req.email, &req.password).await?;
    let token = issue_token(&user, &state.config().jwt_secret)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = session_cookie(&token, TOKEN_TTL_SECS);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": user,
        })),
    ))
}

/// Logout. Clears the session cookie.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "message": "Logout successful" })),
    )
}

/// List all users. Admin only.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let users = crate::db::users::UserRepository::new(state.pool())
        .list_summaries()
        .await?;
    Ok(Json(users))
}

/// Delete a user account. Admin only.
pub async fn delete_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let deleted = crate::db::users::UserRepository::new(state.pool())
        .delete(id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// Change a user's role. Admin only.
pub async fn update_user_role(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse> {
    let user = crate::db::users::UserRepository::new(state.pool())
        .update_role(id, req.role)
        .await?;
    Ok(Json(json!({
        "message": "User role updated successfully",
        "user": user,
    })))
}

/// Update the caller's own profile.
pub async fn edit_profile(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Json(req): Json<EditProfileRequest>,
) -> Result<impl IntoResponse> {
    let update = crate::db::users::ProfileUpdate {
        username: req.username,
        profile_image: req.profile_image,
        bio: req.bio,
        profession: req.profession,
        address: req.address,
    };
    let user = crate::db::users::UserRepository::new(state.pool())
        .update_profile(auth.user_id, update)
        .await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user,
    })))
}

/// Look up a user by email.
pub async fn user_by_email(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let email =
        Email::parse(&email).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;
    let user = crate::db::users::UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(json!({ "user": user })))
}
