//! Notification payloads and errors

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::verification_record::{Purpose, VerificationRecord};

/// Which message to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    EmailVerificationOtp,
    PasswordResetOtp,
    PasswordResetToken,
}

impl From<Purpose> for NotificationKind {
    fn from(purpose: Purpose) -> Self {
        match purpose {
            Purpose::EmailVerification => NotificationKind::EmailVerificationOtp,
            Purpose::PasswordResetOtp => NotificationKind::PasswordResetOtp,
            Purpose::PasswordResetToken => NotificationKind::PasswordResetToken,
        }
    }
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::EmailVerificationOtp => "email_verification_otp",
            NotificationKind::PasswordResetOtp => "password_reset_otp",
            NotificationKind::PasswordResetToken => "password_reset_token",
        }
    }
}

/// A request to tell a user about a freshly issued secret
#[derive(Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub user_id: Uuid,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    pub valid_for_minutes: i64,
}

impl Notification {
    pub fn for_record(record: &VerificationRecord) -> Self {
        Self {
            kind: record.purpose.into(),
            user_id: record.user_id,
            secret: record.secret.clone(),
            expires_at: record.expires_at,
            valid_for_minutes: record.valid_for_minutes(),
        }
    }
}

// Secrets must not end up in logs through Debug
impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("kind", &self.kind)
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("valid_for_minutes", &self.valid_for_minutes)
            .finish()
    }
}

/// Notification queue and delivery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Notification queue is full")]
    QueueFull,

    #[error("Notification queue is closed")]
    QueueClosed,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
