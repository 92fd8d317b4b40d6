//! Unit tests for the in-memory verification repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::errors::DomainError;
use crate::repositories::verification::{InMemoryVerificationRepository, VerificationRepository};

fn record(purpose: Purpose, user_id: Uuid, secret: &str, minutes_ago: i64) -> VerificationRecord {
    VerificationRecord::new(
        user_id,
        purpose,
        secret.to_string(),
        Duration::minutes(15),
        Utc::now() - Duration::minutes(minutes_ago),
    )
}

#[tokio::test]
async fn test_codes_may_repeat_across_users_and_history() {
    let repo = InMemoryVerificationRepository::new();
    let user_id = Uuid::new_v4();

    let mut spent = record(Purpose::EmailVerification, Uuid::new_v4(), "111111", 60 * 24 * 30);
    spent.mark_as_used(Utc::now());
    repo.insert(spent).await.unwrap();
    repo.insert(record(Purpose::EmailVerification, Uuid::new_v4(), "111111", 0))
        .await
        .unwrap();
    let mine = repo
        .insert(record(Purpose::EmailVerification, user_id, "111111", 0))
        .await
        .unwrap();

    let found = repo
        .find_latest_unused(Purpose::EmailVerification, user_id, "111111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, mine.id);

    let outcome = repo
        .supersede_and_insert(record(Purpose::PasswordResetOtp, user_id, "111111", 0))
        .await
        .unwrap();
    assert_eq!(outcome.superseded, 0);
    assert_eq!(repo.count(Purpose::EmailVerification).await, 3);
}

#[tokio::test]
async fn test_duplicate_token_is_store_failure() {
    let repo = InMemoryVerificationRepository::new();
    let token = "t".repeat(43);

    repo.insert(record(Purpose::PasswordResetToken, Uuid::new_v4(), &token, 0))
        .await
        .unwrap();
    let result = repo
        .insert(record(Purpose::PasswordResetToken, Uuid::new_v4(), &token, 0))
        .await;
    assert!(matches!(result, Err(DomainError::Internal { .. })));
    assert_eq!(repo.count(Purpose::PasswordResetToken).await, 1);
}

#[tokio::test]
async fn test_failed_supersede_leaves_outstanding_records_untouched() {
    let repo = InMemoryVerificationRepository::new();
    let user_id = Uuid::new_v4();
    let taken = "u".repeat(43);

    let outstanding = repo
        .insert(record(Purpose::PasswordResetToken, user_id, &"a".repeat(43), 1))
        .await
        .unwrap();
    let mut spent = record(Purpose::PasswordResetToken, Uuid::new_v4(), &taken, 30);
    spent.mark_as_used(Utc::now());
    repo.insert(spent).await.unwrap();

    let result = repo
        .supersede_and_insert(record(Purpose::PasswordResetToken, user_id, &taken, 0))
        .await;
    assert!(matches!(result, Err(DomainError::Internal { .. })));

    let outstanding = repo
        .find_by_id(Purpose::PasswordResetToken, outstanding.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!outstanding.is_used);
    assert_eq!(repo.count(Purpose::PasswordResetToken).await, 2);
}

#[tokio::test]
async fn test_supersede_marks_only_same_user_and_purpose() {
    let repo = InMemoryVerificationRepository::new();
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    let first = repo
        .insert(record(Purpose::PasswordResetOtp, user_id, "111111", 2))
        .await
        .unwrap();
    let other = repo
        .insert(record(Purpose::PasswordResetOtp, other_user, "222222", 2))
        .await
        .unwrap();
    let email = repo
        .insert(record(Purpose::EmailVerification, user_id, "333333", 2))
        .await
        .unwrap();

    let outcome = repo
        .supersede_and_insert(record(Purpose::PasswordResetOtp, user_id, "444444", 0))
        .await
        .unwrap();
    assert_eq!(outcome.superseded, 1);

    let first = repo.find_by_id(Purpose::PasswordResetOtp, first.id).await.unwrap().unwrap();
    assert!(first.is_used);
    assert_eq!(first.updated_at, outcome.record.created_at);

    let other = repo.find_by_id(Purpose::PasswordResetOtp, other.id).await.unwrap().unwrap();
    assert!(!other.is_used);
    let email = repo.find_by_id(Purpose::EmailVerification, email.id).await.unwrap().unwrap();
    assert!(!email.is_used);
}

#[tokio::test]
async fn test_find_latest_unused_prefers_newest() {
    let repo = InMemoryVerificationRepository::new();
    let user_id = Uuid::new_v4();

    let older = repo
        .insert(record(Purpose::EmailVerification, user_id, "123456", 5))
        .await
        .unwrap();
    let newer = repo
        .insert(record(Purpose::EmailVerification, user_id, "123456", 1))
        .await
        .unwrap();
    assert_ne!(older.id, newer.id);

    let found = repo
        .find_latest_unused(Purpose::EmailVerification, user_id, "123456")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, newer.id);

    // Once the newer one is spent the older one is next
    assert!(repo
        .mark_as_used(Purpose::EmailVerification, newer.id, Utc::now())
        .await
        .unwrap());
    let found = repo
        .find_latest_unused(Purpose::EmailVerification, user_id, "123456")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, older.id);

    assert!(repo
        .find_latest_unused(Purpose::EmailVerification, Uuid::new_v4(), "123456")
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_latest_unused(Purpose::PasswordResetOtp, user_id, "123456")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_mark_as_used_is_conditional() {
    let repo = InMemoryVerificationRepository::new();
    let stored = repo
        .insert(record(Purpose::PasswordResetToken, Uuid::new_v4(), &"t".repeat(43), 0))
        .await
        .unwrap();
    let now = Utc::now();

    assert!(repo.mark_as_used(Purpose::PasswordResetToken, stored.id, now).await.unwrap());
    assert!(!repo.mark_as_used(Purpose::PasswordResetToken, stored.id, now).await.unwrap());
    // Wrong collection
    assert!(!repo.mark_as_used(Purpose::PasswordResetOtp, stored.id, now).await.unwrap());

    let found = repo
        .find_by_secret(Purpose::PasswordResetToken, &"t".repeat(43))
        .await
        .unwrap()
        .unwrap();
    assert!(found.is_used);
    assert!(repo
        .find_latest_unused(Purpose::PasswordResetToken, stored.user_id, &"t".repeat(43))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_find_by_user_newest_first() {
    let repo = InMemoryVerificationRepository::new();
    let user_id = Uuid::new_v4();

    for (secret, minutes_ago) in [("100000", 10), ("200000", 1), ("300000", 5)] {
        repo.insert(record(Purpose::EmailVerification, user_id, secret, minutes_ago))
            .await
            .unwrap();
    }

    let secrets: Vec<String> = repo
        .find_by_user(Purpose::EmailVerification, user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.secret)
        .collect();
    assert_eq!(secrets, vec!["200000", "300000", "100000"]);
    assert_eq!(repo.count(Purpose::EmailVerification).await, 3);
}
