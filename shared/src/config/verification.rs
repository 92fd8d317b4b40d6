//! Verification code lifetimes

use serde::{Deserialize, Serialize};

/// Lifetimes for issued codes and tokens
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Email verification OTP lifetime in minutes
    pub email_otp_ttl_minutes: i64,

    /// Password reset OTP lifetime in minutes
    pub password_reset_otp_ttl_minutes: i64,

    /// Password reset link token lifetime in minutes
    pub password_reset_token_ttl_minutes: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email_otp_ttl_minutes: 15,
            password_reset_otp_ttl_minutes: 15,
            password_reset_token_ttl_minutes: 60,
        }
    }
}
