//! Verification record repository trait.
//!
//! Records are namespaced by [`Purpose`]; every method takes the purpose and
//! only touches that collection. The two mutating operations are the only
//! way record state changes:
//! - [`VerificationRepository::supersede_and_insert`] invalidates a user's
//!   outstanding records and inserts a new one as one atomic unit
//! - [`VerificationRepository::mark_as_used`] is a conditional update that
//!   reports whether the caller won the transition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::errors::DomainError;

/// Result of an invalidate-then-insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersedeOutcome {
    /// The inserted record
    pub record: VerificationRecord,
    /// How many outstanding records were marked as used
    pub superseded: u64,
}

/// Repository trait for verification record persistence
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Insert a new record
    ///
    /// For purposes whose secret identifies the record on its own (link
    /// tokens), a secret already present in the collection is a store failure
    /// (`DomainError::Internal`), not retried. Codes may repeat.
    async fn insert(&self, record: VerificationRecord) -> Result<VerificationRecord, DomainError>;

    /// Mark every unused record of the same user and purpose as used, then
    /// insert `record`, in one atomic unit
    ///
    /// If the insert fails nothing is superseded.
    async fn supersede_and_insert(
        &self,
        record: VerificationRecord,
    ) -> Result<SupersedeOutcome, DomainError>;

    /// Newest unused record of `user_id` with exactly this secret
    async fn find_latest_unused(
        &self,
        purpose: Purpose,
        user_id: Uuid,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Newest record with exactly this secret, used or not
    async fn find_by_secret(
        &self,
        purpose: Purpose,
        secret: &str,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Find a record by id
    async fn find_by_id(
        &self,
        purpose: Purpose,
        id: Uuid,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Set `is_used` if it is still false
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - The record was already used or does not exist
    async fn mark_as_used(
        &self,
        purpose: Purpose,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// All records of a user for one purpose, newest first
    async fn find_by_user(
        &self,
        purpose: Purpose,
        user_id: Uuid,
    ) -> Result<Vec<VerificationRecord>, DomainError>;
}
