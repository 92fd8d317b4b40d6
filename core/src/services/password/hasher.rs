//! bcrypt password hashing

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::errors::{DomainError, DomainResult};

/// Hashes and verifies passwords with bcrypt on the blocking thread pool
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Hash compared against when the account does not exist, so unknown
    // emails take as long as wrong passwords
    dummy_hash: Arc<OnceCell<String>>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password verification task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("password verification failed: {}", e)))
    }

    /// Spend the same work as a real verification, always failing
    pub async fn verify_dummy(&self, password: &str) -> DomainResult<bool> {
        let dummy = match self.dummy_hash.get() {
            Some(hash) => hash.clone(),
            None => {
                let hash = self.hash("keygate-unknown-account").await?;
                self.dummy_hash.get_or_init(|| hash).clone()
            }
        };
        self.verify(password, &dummy).await?;
        Ok(false)
    }
}
