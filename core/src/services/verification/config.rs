//! Configuration for the verification service

use chrono::Duration;
use kg_shared::config::VerificationConfig;

use crate::domain::entities::verification_record::Purpose;

/// Lifetimes of issued records per purpose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationServiceConfig {
    /// Email verification OTP lifetime
    pub email_otp_ttl: Duration,
    /// Password reset OTP lifetime
    pub password_reset_otp_ttl: Duration,
    /// Password reset link token lifetime
    pub password_reset_token_ttl: Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            email_otp_ttl: Duration::minutes(config.email_otp_ttl_minutes),
            password_reset_otp_ttl: Duration::minutes(config.password_reset_otp_ttl_minutes),
            password_reset_token_ttl: Duration::minutes(config.password_reset_token_ttl_minutes),
        }
    }
}

impl VerificationServiceConfig {
    pub fn ttl_for(&self, purpose: Purpose) -> Duration {
        match purpose {
            Purpose::EmailVerification => self.email_otp_ttl,
            Purpose::PasswordResetOtp => self.password_reset_otp_ttl,
            Purpose::PasswordResetToken => self.password_reset_token_ttl,
        }
    }
}
