//! MySQL implementation of the UserRepository trait.
//!
//! Emails arrive already normalized; the unique key on `email` is what turns
//! a racing duplicate registration into `EmailAlreadyRegistered`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use kg_core::domain::entities::user::User;
use kg_core::errors::{AccountError, DomainError};
use kg_core::repositories::UserRepository;

use super::{db_error, is_unique_violation};

const USER_COLUMNS: &str = "id, email, first_name, last_name, password_hash, \
     is_email_verified, is_active, created_at, updated_at";

/// MySQL implementation of UserRepository
#[derive(Clone)]
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("Invalid user UUID: {}", e)))?,
            email: row.try_get("email").map_err(db_error("Failed to get email"))?,
            first_name: row
                .try_get("first_name")
                .map_err(db_error("Failed to get first_name"))?,
            last_name: row
                .try_get("last_name")
                .map_err(db_error("Failed to get last_name"))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(db_error("Failed to get password_hash"))?,
            is_email_verified: row
                .try_get("is_email_verified")
                .map_err(db_error("Failed to get is_email_verified"))?,
            is_active: row
                .try_get("is_active")
                .map_err(db_error("Failed to get is_active"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(db_error("Failed to get updated_at"))?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = format!(
            "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            USER_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.is_email_verified)
            .bind(user.is_active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AccountError::EmailAlreadyRegistered.into()),
            Err(e) => Err(db_error("Failed to create user")(e)),
        }
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update password hash"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_email_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE users SET is_email_verified = TRUE, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to mark email verified"))?;

        Ok(result.rows_affected() > 0)
    }
}
