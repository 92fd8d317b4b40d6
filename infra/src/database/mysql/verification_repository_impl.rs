//! MySQL implementation of the VerificationRepository trait.
//!
//! Each purpose maps to its own table (see [`Purpose::table_name`]). The two
//! state-changing operations rely on the database for atomicity:
//! - `supersede_and_insert` runs the invalidating `UPDATE` and the `INSERT`
//!   in one transaction; the locking update serialises concurrent reissues
//!   for the same user
//! - `mark_as_used` is a single conditional `UPDATE ... AND is_used = FALSE`
//!   and reports whether it changed a row

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use kg_core::domain::entities::verification_record::{Purpose, VerificationRecord};
use kg_core::errors::DomainError;
use kg_core::repositories::{SupersedeOutcome, VerificationRepository};

use super::{db_error, is_unique_violation};

const RECORD_COLUMNS: &str = "id, user_id, secret, created_at, expires_at, is_used, updated_at";

/// MySQL implementation of VerificationRepository
#[derive(Clone)]
pub struct MySqlVerificationRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationRepository {
    /// Create a new MySQL verification record repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to a record of `purpose`
    fn row_to_record(row: &MySqlRow, purpose: Purpose) -> Result<VerificationRecord, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(db_error("Failed to get user_id"))?;

        Ok(VerificationRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("Invalid record UUID: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::internal(format!("Invalid user UUID: {}", e)))?,
            purpose,
            secret: row.try_get("secret").map_err(db_error("Failed to get secret"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("Failed to get expires_at"))?,
            is_used: row.try_get("is_used").map_err(db_error("Failed to get is_used"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(db_error("Failed to get updated_at"))?,
        })
    }

    fn insert_sql(purpose: Purpose) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            purpose.table_name(),
            RECORD_COLUMNS
        )
    }

    fn map_insert_error(purpose: Purpose, err: sqlx::Error) -> DomainError {
        if is_unique_violation(&err) {
            DomainError::internal(format!("duplicate secret in {}", purpose.table_name()))
        } else {
            db_error("Failed to insert verification record")(err)
        }
    }

    async fn fetch_optional(
        &self,
        purpose: Purpose,
        query: &str,
        binds: &[String],
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let mut q = sqlx::query(query);
        for value in binds {
            q = q.bind(value.as_str());
        }
        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load verification record"))?;

        row.map(|r| Self::row_to_record(&r, purpose)).transpose()
    }
}

#[async_trait]
impl VerificationRepository for MySqlVerificationRepository {
    async fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, DomainError> {
        sqlx::query(&Self::insert_sql(record.purpose))
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(&record.secret)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.is_used)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_insert_error(record.purpose, e))?;

        Ok(record)
    }

    async fn supersede_and_insert(
        &self,
        record: VerificationRecord,
    ) -> Result<SupersedeOutcome, DomainError> {
        let purpose = record.purpose;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let update = format!(
            "UPDATE {} SET is_used = TRUE, updated_at = ? WHERE user_id = ? AND is_used = FALSE",
            purpose.table_name()
        );
        let superseded = sqlx::query(&update)
            .bind(record.created_at)
            .bind(record.user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to supersede verification records"))?
            .rows_affected();

        sqlx::query(&Self::insert_sql(purpose))
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(&record.secret)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.is_used)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::map_insert_error(purpose, e))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit supersession"))?;

        Ok(SupersedeOutcome { record, superseded })
    }

    async fn find_latest_unused(
        &self,
        purpose: Purpose,
        user_id: Uuid,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = ? AND secret = ? AND is_used = FALSE \
             ORDER BY created_at DESC LIMIT 1",
            RECORD_COLUMNS,
            purpose.table_name()
        );
        self.fetch_optional(purpose, &query, &[user_id.to_string(), secret.to_string()])
            .await
    }

    async fn find_by_secret(
        &self,
        purpose: Purpose,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} WHERE secret = ? ORDER BY created_at DESC LIMIT 1",
            RECORD_COLUMNS,
            purpose.table_name()
        );
        self.fetch_optional(purpose, &query, &[secret.to_string()])
            .await
    }

    async fn find_by_id(
        &self,
        purpose: Purpose,
        id: Uuid,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = ? LIMIT 1",
            RECORD_COLUMNS,
            purpose.table_name()
        );
        self.fetch_optional(purpose, &query, &[id.to_string()]).await
    }

    async fn mark_as_used(
        &self,
        purpose: Purpose,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = format!(
            "UPDATE {} SET is_used = TRUE, updated_at = ? WHERE id = ? AND is_used = FALSE",
            purpose.table_name()
        );
        let result = sqlx::query(&query)
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to mark verification record used"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_user(
        &self,
        purpose: Purpose,
        user_id: Uuid,
    ) -> Result<Vec<VerificationRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = ? ORDER BY created_at DESC",
            RECORD_COLUMNS,
            purpose.table_name()
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list verification records"))?;

        rows.iter()
            .map(|row| Self::row_to_record(row, purpose))
            .collect()
    }
}
