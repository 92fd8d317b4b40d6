//! Tests for registration and sign-in

use std::sync::Arc;

use crate::domain::entities::user::NewUser;
use crate::domain::entities::verification_record::Purpose;
use crate::errors::{AccountError, DomainError, ValidationError, VerificationError};
use crate::repositories::memory::InMemoryVerificationRepository;
use crate::repositories::UserRepository;
use crate::services::notification::NotificationKind;
use crate::services::rate_limit::UnlimitedQuota;

use super::mocks::{
    harness, harness_with, CapturingQueue, RecordingQuota, UnavailableRepository, PASSWORD,
};

fn new_user(email: &str, password: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: password.to_string(),
        first_name: " Grace ".to_string(),
        last_name: "Hopper".to_string(),
    }
}

#[tokio::test]
async fn test_register_creates_unverified_user_and_sends_code() {
    let h = harness();

    let user = h
        .service
        .register_user(new_user("Grace@Example.com", PASSWORD))
        .await
        .unwrap();

    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.first_name, "Grace");
    assert!(!user.is_email_verified);
    assert!(h.hasher.verify(PASSWORD, &user.password_hash).await.unwrap());

    let notification = h.queue.last().unwrap();
    assert_eq!(notification.kind, NotificationKind::EmailVerificationOtp);
    assert_eq!(notification.user_id, user.id);

    h.service
        .verify_email("grace@example.com", &notification.secret)
        .await
        .unwrap();
    assert!(h.user(user.id).await.is_email_verified);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let h = harness();
    h.service
        .register_user(new_user("grace@example.com", PASSWORD))
        .await
        .unwrap();

    let duplicate = h
        .service
        .register_user(new_user("GRACE@example.com", PASSWORD))
        .await;
    assert!(matches!(
        duplicate,
        Err(DomainError::Account(AccountError::EmailAlreadyRegistered))
    ));

    let weak = h.service.register_user(new_user("other@example.com", "1234")).await;
    assert!(matches!(
        weak,
        Err(DomainError::Verification(VerificationError::PasswordPolicy { .. }))
    ));
    assert!(h.users.find_by_email("other@example.com").await.unwrap().is_none());

    let invalid = h.service.register_user(new_user("nope", PASSWORD)).await;
    assert!(matches!(
        invalid,
        Err(DomainError::ValidationErr(ValidationError::InvalidEmail))
    ));
    assert_eq!(h.users.len().await, 1);
}

#[tokio::test]
async fn test_register_succeeds_when_code_cannot_be_issued() {
    let h = harness_with(
        UnavailableRepository,
        Arc::new(CapturingQueue::default()),
        Arc::new(UnlimitedQuota),
    );

    let user = h
        .service
        .register_user(new_user("grace@example.com", PASSWORD))
        .await
        .unwrap();

    assert!(!user.is_email_verified);
    assert!(h.users.find_by_id(user.id).await.unwrap().is_some());
    assert_eq!(h.queue.len(), 0);
}

#[tokio::test]
async fn test_authenticate_verified_user() {
    let h = harness();
    let user = h.seed_user("ada@example.com", true).await;

    let signed_in = h.service.authenticate(" ADA@example.com", PASSWORD).await.unwrap();
    assert_eq!(signed_in.id, user.id);

    for (email, password) in [
        ("ada@example.com", "wrong-password"),
        ("ghost@example.com", PASSWORD),
        ("not-an-email", PASSWORD),
    ] {
        let result = h.service.authenticate(email, password).await;
        assert!(matches!(
            result,
            Err(DomainError::Account(AccountError::InvalidCredentials))
        ));
    }
}

#[tokio::test]
async fn test_inactive_user_cannot_sign_in() {
    let h = harness();
    let mut user = h.seed_user("ada@example.com", true).await;
    user.is_active = false;
    let inactive = crate::repositories::memory::InMemoryUserRepository::new();
    inactive.create(user).await.unwrap();

    let service_users = Arc::new(inactive);
    let records = Arc::new(InMemoryVerificationRepository::new());
    let deps = crate::services::verification::ServiceDependencies::new(h.queue.clone())
        .with_hasher(h.hasher.clone());
    let service = crate::services::verification::VerificationService::new(
        service_users,
        records,
        deps,
        Default::default(),
    );

    let result = service.authenticate("ada@example.com", PASSWORD).await;
    assert!(matches!(
        result,
        Err(DomainError::Account(AccountError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_unverified_login_issues_code_independently() {
    let h = harness();
    let user = h.seed_user("ada@example.com", false).await;

    let result = h.service.authenticate("ada@example.com", PASSWORD).await;
    assert!(matches!(
        result,
        Err(DomainError::Account(AccountError::EmailNotVerified))
    ));

    // The code stays issued although the login failed
    let records = h.records_for(Purpose::EmailVerification, user.id).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_used);

    h.service
        .verify_email("ada@example.com", &h.last_secret())
        .await
        .unwrap();
    h.service.authenticate("ada@example.com", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn test_unverified_login_respects_resend_quota() {
    let quota = Arc::new(RecordingQuota::denying());
    let h = harness_with(
        InMemoryVerificationRepository::new(),
        Arc::new(CapturingQueue::default()),
        quota.clone(),
    );
    let user = h.seed_user("ada@example.com", false).await;

    let result = h.service.authenticate("ada@example.com", PASSWORD).await;
    assert!(matches!(
        result,
        Err(DomainError::Account(AccountError::EmailNotVerified))
    ));
    assert_eq!(quota.keys(), vec!["resend_otp:ada@example.com".to_string()]);
    assert!(h.records_for(Purpose::EmailVerification, user.id).await.is_empty());
}
