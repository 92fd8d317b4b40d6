//! Verification record entity: one issued code or token bound to a user and purpose.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a numeric one-time code
pub const NUMERIC_CODE_LENGTH: usize = 6;

/// Minimum length of a URL token (32 bytes in unpadded base64url)
pub const TOKEN_MIN_LENGTH: usize = 43;

/// Shape of the secret a purpose uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Six ASCII digits
    NumericCode,
    /// Base64url string of at least 43 characters
    UrlToken,
}

impl SecretKind {
    /// Check whether a submitted secret has the right shape for this kind
    pub fn is_well_formed(&self, secret: &str) -> bool {
        match self {
            SecretKind::NumericCode => {
                secret.len() == NUMERIC_CODE_LENGTH && secret.bytes().all(|b| b.is_ascii_digit())
            }
            SecretKind::UrlToken => {
                secret.len() >= TOKEN_MIN_LENGTH
                    && secret
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            }
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            SecretKind::NumericCode => "code",
            SecretKind::UrlToken => "token",
        }
    }
}

/// What a verification record is for
///
/// Each purpose is stored in its own collection and selects the secret kind,
/// the lifetime configuration and whether reissuing supersedes older records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    EmailVerification,
    PasswordResetOtp,
    PasswordResetToken,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [
        Purpose::EmailVerification,
        Purpose::PasswordResetOtp,
        Purpose::PasswordResetToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::EmailVerification => "email_verification",
            Purpose::PasswordResetOtp => "password_reset_otp",
            Purpose::PasswordResetToken => "password_reset_token",
        }
    }

    pub fn secret_kind(&self) -> SecretKind {
        match self {
            Purpose::EmailVerification | Purpose::PasswordResetOtp => SecretKind::NumericCode,
            Purpose::PasswordResetToken => SecretKind::UrlToken,
        }
    }

    /// Whether issuing a new record invalidates the user's outstanding ones.
    /// Only password reset OTPs are superseded.
    pub fn supersedes_outstanding(&self) -> bool {
        matches!(self, Purpose::PasswordResetOtp)
    }

    /// Whether the secret alone identifies a record. Link tokens are looked
    /// up without a user and must be unique across the collection; codes are
    /// always matched together with their user and may repeat.
    pub fn secret_is_unique(&self) -> bool {
        matches!(self.secret_kind(), SecretKind::UrlToken)
    }

    /// Table holding records of this purpose
    pub fn table_name(&self) -> &'static str {
        match self {
            Purpose::EmailVerification => "email_verification_otps",
            Purpose::PasswordResetOtp => "password_reset_otps",
            Purpose::PasswordResetToken => "password_reset_tokens",
        }
    }

    /// Quota scope consulted before issuing
    pub fn quota_scope(&self) -> &'static str {
        match self {
            Purpose::EmailVerification => "resend_otp",
            Purpose::PasswordResetOtp => "password_reset_otp",
            Purpose::PasswordResetToken => "password_reset_token",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted, single-use, time-boxed secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Collection this record belongs to
    pub purpose: Purpose,

    /// The code or token, compared in full
    pub secret: String,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the record stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Whether the record has been consumed or superseded; never reset
    pub is_used: bool,

    /// Timestamp of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Creates an unused record expiring `ttl` after `now`
    pub fn new(
        user_id: Uuid,
        purpose: Purpose,
        secret: String,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            secret,
            created_at: now,
            expires_at: now + ttl,
            is_used: false,
            updated_at: now,
        }
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A record is valid while unused and strictly before its expiry
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired_at(now)
    }

    /// Checks validity against the system clock
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Marks the record as used
    ///
    /// Returns `true` if this call performed the transition. Calling it on an
    /// already used record changes nothing.
    pub fn mark_as_used(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_used {
            return false;
        }
        self.is_used = true;
        self.updated_at = now;
        true
    }

    /// Compares a candidate secret without short-circuiting on the first mismatch
    pub fn matches_secret(&self, candidate: &str) -> bool {
        constant_time_eq(self.secret.as_bytes(), candidate.as_bytes())
    }

    /// Remaining lifetime, zero once expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired_at(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }

    /// Lifetime in whole minutes, used when telling the user how long a code lasts
    pub fn valid_for_minutes(&self) -> i64 {
        (self.expires_at - self.created_at).num_minutes()
    }
}
