//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! thimble-cli admin create -e admin@example.com -u "Admin Name" -p <password>
//! ```
//!
//! If an account already exists for the email, it is promoted to admin
//! instead of being recreated.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use thimble_core::Email;

use super::{CommandError, connect};

/// Minimum password length, matching the API's registration rule.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Create a new admin user, or promote an existing account to admin.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, or the database
/// operation fails.
pub async fn create_user(email: &str, username: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidInput(format!("invalid email: {e}")))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CommandError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let pool = connect().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if let Some(id) = existing {
        sqlx::query("UPDATE users SET role = 'admin', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        tracing::info!("Existing user {} promoted to admin (id: {id})", email);
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CommandError::InvalidInput(format!("failed to hash password: {e}")))?
        .to_string();

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role) \
         VALUES ($1, $2, $3, 'admin') \
         RETURNING id",
    )
    .bind(username)
    .bind(email.as_str())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin user created successfully! ID: {id}, Email: {}", email);
    Ok(())
}
