//! Unit tests for the in-memory user repository

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AccountError, DomainError};
use crate::repositories::user::{InMemoryUserRepository, UserRepository};

fn user(email: &str) -> User {
    User::new(
        email.to_string(),
        "Test".to_string(),
        "User".to_string(),
        "hash".to_string(),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_create_and_find() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create(user("a@example.com")).await.unwrap();

    let by_email = repo.find_by_email("a@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "a@example.com");

    assert!(repo.find_by_email("b@example.com").await.unwrap().is_none());
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.create(user("a@example.com")).await.unwrap();

    let result = repo.create(user("a@example.com")).await;
    assert!(matches!(
        result,
        Err(DomainError::Account(AccountError::EmailAlreadyRegistered))
    ));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_updates_report_missing_user() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create(user("a@example.com")).await.unwrap();
    let now = Utc::now();

    assert!(repo.mark_email_verified(created.id, now).await.unwrap());
    assert!(repo.set_password_hash(created.id, "new-hash", now).await.unwrap());
    assert!(!repo.mark_email_verified(Uuid::new_v4(), now).await.unwrap());

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert!(stored.is_email_verified);
    assert_eq!(stored.password_hash, "new-hash");
    assert_eq!(stored.updated_at, now);
}
