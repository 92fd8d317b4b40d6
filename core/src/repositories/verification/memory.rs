//! In-memory implementation of VerificationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::errors::DomainError;

use super::trait_::{SupersedeOutcome, VerificationRepository};

/// In-memory verification record store
#[derive(Clone, Default)]
pub struct InMemoryVerificationRepository {
    records: Arc<RwLock<HashMap<Uuid, VerificationRecord>>>,
}

impl InMemoryVerificationRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records for a purpose
    pub async fn count(&self, purpose: Purpose) -> usize {
        let records = self.records.read().await;
        records.values().filter(|r| r.purpose == purpose).count()
    }

    // Only link tokens must be unique; codes repeat across users and history
    fn ensure_unique_secret(
        records: &HashMap<Uuid, VerificationRecord>,
        record: &VerificationRecord,
    ) -> Result<(), DomainError> {
        if record.purpose.secret_is_unique()
            && records
                .values()
                .any(|r| r.purpose == record.purpose && r.secret == record.secret)
        {
            return Err(DomainError::internal(format!(
                "duplicate secret in {}",
                record.purpose.table_name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, DomainError> {
        let mut records = self.records.write().await;
        Self::ensure_unique_secret(&records, &record)?;
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn supersede_and_insert(
        &self,
        record: VerificationRecord,
    ) -> Result<SupersedeOutcome, DomainError> {
        let mut records = self.records.write().await;
        // Nothing is touched unless the insert is going to succeed
        Self::ensure_unique_secret(&records, &record)?;

        let mut superseded = 0;
        for existing in records.values_mut().filter(|r| {
            r.purpose == record.purpose && r.user_id == record.user_id && !r.is_used
        }) {
            if existing.mark_as_used(record.created_at) {
                superseded += 1;
            }
        }

        records.insert(record.id, record.clone());
        Ok(SupersedeOutcome { record, superseded })
    }

    async fn find_latest_unused(
        &self,
        purpose: Purpose,
        user_id: Uuid,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.purpose == purpose && r.user_id == user_id && !r.is_used)
            .filter(|r| r.matches_secret(secret))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn find_by_secret(
        &self,
        purpose: Purpose,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.purpose == purpose && r.matches_secret(secret))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn find_by_id(
        &self,
        purpose: Purpose,
        id: Uuid,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(&id).filter(|r| r.purpose == purpose).cloned())
    }

    async fn mark_as_used(
        &self,
        purpose: Purpose,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(match records.get_mut(&id) {
            Some(record) if record.purpose == purpose => record.mark_as_used(now),
            _ => false,
        })
    }

    async fn find_by_user(
        &self,
        purpose: Purpose,
        user_id: Uuid,
    ) -> Result<Vec<VerificationRecord>, DomainError> {
        let records = self.records.read().await;
        let mut found: Vec<VerificationRecord> = records
            .values()
            .filter(|r| r.purpose == purpose && r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}
