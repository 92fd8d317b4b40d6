//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// A fixed-window quota: at most `limit` requests per `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuotaRule {
    pub limit: u32,
    pub window_seconds: u64,
}

impl QuotaRule {
    pub const fn per_hour(limit: u32) -> Self {
        Self {
            limit,
            window_seconds: 3600,
        }
    }
}

/// Per-email quotas for the code issuance endpoints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,

    /// Email verification resends
    pub resend_otp: QuotaRule,

    /// Password reset OTP requests
    pub password_reset_otp: QuotaRule,

    /// Password reset link requests
    pub password_reset_token: QuotaRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resend_otp: QuotaRule::per_hour(3),
            password_reset_otp: QuotaRule::per_hour(3),
            password_reset_token: QuotaRule::per_hour(3),
        }
    }
}

impl RateLimitConfig {
    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            enabled: true,
            resend_otp: QuotaRule::per_hour(30),
            password_reset_otp: QuotaRule::per_hour(30),
            password_reset_token: QuotaRule::per_hour(30),
        }
    }

    /// Look up the rule for a quota scope name
    pub fn rule_for(&self, scope: &str) -> Option<QuotaRule> {
        match scope {
            "resend_otp" => Some(self.resend_otp),
            "password_reset_otp" => Some(self.password_reset_otp),
            "password_reset_token" => Some(self.password_reset_token),
            _ => None,
        }
    }
}
