//! User account queries.

use sqlx::PgPool;

use thimble_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::models::{Address, User, UserSummary};

/// Row returned by user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    role: UserRole,
    profile_image: Option<String>,
    bio: Option<String>,
    profession: Option<String>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_state: Option<String>,
    address_postal_code: Option<String>,
    address_country: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in users table: {e}")))?;
        Ok(User {
            id: row.id,
            username: row.username,
            email,
            role: row.role,
            profile_image: row.profile_image,
            bio: row.bio,
            profession: row.profession,
            address: Address {
                street: row.address_street,
                city: row.address_city,
                state: row.address_state,
                postal_code: row.address_postal_code,
                country: row.address_country,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, role, profile_image, bio, profession, \
     address_street, address_city, address_state, address_postal_code, address_country, \
     created_at, updated_at";

/// Fields accepted by [`UserRepository::update_profile`].
///
/// `None` fields are left untouched; address parts overwrite when present.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub profession: Option<String>,
    pub address: Option<Address>,
}

/// Repository for user account operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user with the given password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(email.as_str())
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique_violation(e, "email"))?;
        row.try_into()
    }

    /// Fetch a user by id.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Fetch a user by email.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Fetch a user together with their password hash, for login.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");

        #[derive(sqlx::FromRow)]
        struct WithHash {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, WithHash>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    /// List all users, newest first.
    pub async fn list_summaries(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let user = User::try_from(row)?;
                Ok(UserSummary {
                    id: user.id,
                    email: user.email,
                    role: user.role,
                    username: user.username,
                    address: user.address,
                })
            })
            .collect()
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role.
    pub async fn update_role(&self, id: UserId, role: UserRole) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    /// Apply a partial profile update. Unset fields keep their current value.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let (street, city, state, postal_code, country) = match update.address {
            Some(a) => (a.street, a.city, a.state, a.postal_code, a.country),
            None => (None, None, None, None, None),
        };
        let sql = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                profile_image = COALESCE($3, profile_image), \
                bio = COALESCE($4, bio), \
                profession = COALESCE($5, profession), \
                address_street = COALESCE($6, address_street), \
                address_city = COALESCE($7, address_city), \
                address_state = COALESCE($8, address_state), \
                address_postal_code = COALESCE($9, address_postal_code), \
                address_country = COALESCE($10, address_country), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(update.username)
            .bind(update.profile_image)
            .bind(update.bio)
            .bind(update.profession)
            .bind(street)
            .bind(city)
            .bind(state)
            .bind(postal_code)
            .bind(country)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }
}
