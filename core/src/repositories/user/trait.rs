//! User repository trait defining the interface the verification flows need
//! from the user directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Emails are stored and looked up in normalized form; callers normalize
/// before calling.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized email address
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with this email
    /// * `Err(DomainError)` - Store failure
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Create a new user
    ///
    /// # Errors
    /// * `AccountError::EmailAlreadyRegistered` - The email is taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Store a new password hash
    ///
    /// Returns `false` if no user has this id.
    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Mark the user's email as verified
    ///
    /// Returns `false` if no user has this id.
    async fn mark_email_verified(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError>;
}
