//! Request and result types for issuance and confirmation

use uuid::Uuid;

use crate::domain::entities::verification_record::Purpose;

/// Response to an issue request
///
/// Identical whether or not the email belongs to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueAcknowledgement {
    pub purpose: Purpose,
    pub message: String,
}

impl IssueAcknowledgement {
    pub fn for_purpose(purpose: Purpose) -> Self {
        let what = match purpose {
            Purpose::EmailVerification => "a verification code",
            Purpose::PasswordResetOtp => "a password reset code",
            Purpose::PasswordResetToken => "a password reset link",
        };
        Self {
            purpose,
            message: format!("If an account exists for this email, {} has been sent.", what),
        }
    }
}

/// How the candidate record is located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationKey<'a> {
    /// OTP purposes: the user's email plus the code
    Email(&'a str),
    /// Link tokens: the token alone
    Token,
}

/// What a successful confirmation does
#[derive(Clone, PartialEq, Eq)]
pub enum ConfirmationEffect {
    MarkEmailVerified,
    SetPassword(String),
}

impl ConfirmationEffect {
    /// Whether this effect belongs to `purpose`
    pub fn applies_to(&self, purpose: Purpose) -> bool {
        match self {
            ConfirmationEffect::MarkEmailVerified => purpose == Purpose::EmailVerification,
            ConfirmationEffect::SetPassword(_) => purpose != Purpose::EmailVerification,
        }
    }
}

impl std::fmt::Debug for ConfirmationEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationEffect::MarkEmailVerified => f.write_str("MarkEmailVerified"),
            ConfirmationEffect::SetPassword(_) => f.write_str("SetPassword(<redacted>)"),
        }
    }
}

/// Result of a successful confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationReceipt {
    pub user_id: Uuid,
    pub record_id: Uuid,
    pub purpose: Purpose,
}
