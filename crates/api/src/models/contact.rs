//! Contact form domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use thimble_core::ContactId;

/// A contact form submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
