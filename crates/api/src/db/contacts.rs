//! Contact form message queries.

use sqlx::PgPool;

use thimble_core::ContactId;

use crate::db::RepositoryError;
use crate::models::ContactMessage;

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    name: String,
    email: String,
    message: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ContactRow> for ContactMessage {
    fn from(row: ContactRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

/// Repository for contact form submissions.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a submission.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            "INSERT INTO contact_messages (name, email, message) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, email, message, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// All submissions, newest first.
    pub async fn list_all(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, name, email, message, created_at \
             FROM contact_messages ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(ContactMessage::from).collect())
    }
}
