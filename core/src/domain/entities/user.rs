//! User entity representing a registered account in Keygate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Normalized (trimmed, lowercase) email address
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// bcrypt hash of the current password
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Whether the email address has been confirmed with a verification code
    pub is_email_verified: bool,

    /// Whether the account may sign in at all
    pub is_active: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified user
    ///
    /// The caller is responsible for normalizing the email and hashing the password.
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            password_hash,
            is_email_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name used to greet the user in messages
    pub fn display_name(&self) -> &str {
        let first = self.first_name.trim();
        if !first.is_empty() {
            return first;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Marks the email address as verified
    pub fn verify_email(&mut self, now: DateTime<Utc>) {
        self.is_email_verified = true;
        self.updated_at = now;
    }

    /// Replaces the stored password hash
    pub fn set_password_hash(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.updated_at = now;
    }
}

/// Registration input as received from a caller
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "jane@example.com".to_string(),
            "Jane".to_string(),
            "Doe".to_string(),
            "$2b$04$hash".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_user_starts_unverified() {
        let user = sample_user();
        assert!(!user.is_email_verified);
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let mut user = sample_user();
        assert_eq!(user.display_name(), "Jane");
        assert_eq!(user.full_name(), "Jane Doe");

        user.first_name = "  ".to_string();
        assert_eq!(user.display_name(), "jane");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "jane@example.com");
    }

    #[test]
    fn test_verify_email_bumps_updated_at() {
        let mut user = sample_user();
        let later = user.updated_at + chrono::Duration::minutes(1);
        user.verify_email(later);
        assert!(user.is_email_verified);
        assert_eq!(user.updated_at, later);
    }
}
