//! Password policy trait and the built-in rules

use crate::domain::entities::user::User;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

// Small deny-list of the most common passwords; longer lists belong in a
// dedicated validator behind the trait.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "11111111", "abc12345", "letmein1",
    "welcome1", "admin123", "sunshine", "football", "baseball", "trustno1",
    "passw0rd", "00000000",
];

/// Password strength validation
///
/// Reasons are returned as human-readable strings and surfaced to the
/// caller unchanged.
pub trait PasswordPolicy: Send + Sync {
    fn validate(&self, password: &str, user: Option<&User>) -> Result<(), Vec<String>>;
}

/// Length, numeric-only, common-password and similarity checks
#[derive(Debug, Clone)]
pub struct DefaultPasswordPolicy {
    pub min_length: usize,
}

impl Default for DefaultPasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl DefaultPasswordPolicy {
    fn is_similar_to_user(password: &str, user: &User) -> bool {
        let password = password.to_lowercase();
        let local_part = user.email.split('@').next().unwrap_or_default();

        [local_part, user.first_name.as_str(), user.last_name.as_str()]
            .iter()
            .map(|attr| attr.trim().to_lowercase())
            .filter(|attr| attr.len() >= 3)
            .any(|attr| password.contains(&attr) || attr.contains(&password))
    }
}

impl PasswordPolicy for DefaultPasswordPolicy {
    fn validate(&self, password: &str, user: Option<&User>) -> Result<(), Vec<String>> {
        let mut reasons = Vec::new();

        if password.chars().count() < self.min_length {
            reasons.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            reasons.push("This password is entirely numeric.".to_string());
        }
        if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            reasons.push("This password is too common.".to_string());
        }
        if let Some(user) = user {
            if Self::is_similar_to_user(password, user) {
                reasons.push("The password is too similar to the account details.".to_string());
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}
