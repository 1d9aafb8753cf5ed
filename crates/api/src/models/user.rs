//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use thimble_core::{Email, UserId, UserRole};

/// A registered shopper or administrator (domain type).
///
/// The password hash never leaves the repository layer, so this type is
/// safe to serialize into responses as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// Account role.
    pub role: UserRole,
    /// Hosted profile image URL.
    pub profile_image: Option<String>,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Free-form profession.
    pub profession: Option<String>,
    /// Shipping address.
    pub address: Address,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user's shipping address. All fields are optional; an account starts
/// with an empty address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Trimmed-down user record for the admin user listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub username: String,
    pub address: Address,
}
