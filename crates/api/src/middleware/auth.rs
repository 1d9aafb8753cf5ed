//! Authentication extractors for protected routes.
//!
//! The session token rides in an `HttpOnly` cookie named `token`, with an
//! `Authorization: Bearer` fallback for non-browser clients. Handlers opt in
//! with [`RequireAuth`] (any signed-in user) or [`RequireAdmin`] (admin role).

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use thimble_core::{UserId, UserRole};

use crate::services::auth::{Claims, decode_token};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// The authenticated caller, decoded from the session token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: UserRole,
}

/// Extractor that rejects unauthenticated requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub AuthUser);

/// Extractor that additionally rejects non-admin callers with 403.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub AuthUser);

/// Rejection returned by the auth extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// No token, or the token is invalid or expired.
    Unauthorized,
    /// Valid token, but the caller lacks the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Pull the session token out of the request headers.
///
/// The cookie takes precedence; `Authorization: Bearer` is the fallback.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookie_header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Decode the caller's identity from the request, if a valid token is present.
fn authenticate(parts: &Parts, state: &AppState) -> Option<AuthUser> {
    let token = token_from_headers(&parts.headers)?;
    let claims: Claims = decode_token(&token, &state.config().jwt_secret).ok()?;
    let user_id: i32 = claims.sub.parse().ok()?;
    Some(AuthUser {
        user_id: UserId::new(user_id),
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).ok_or(AuthRejection::Unauthorized)?;
        if !user.role.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Build the `Set-Cookie` value that establishes a session.
///
/// `SameSite=None; Secure` so the cookie survives cross-origin requests from
/// the storefront.
#[must_use]
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={max_age_secs}"
    )
}

/// Build the `Set-Cookie` value that clears the session.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc", 3600);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
