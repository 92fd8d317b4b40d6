//! Plain-text email rendering

use kg_shared::config::NotificationConfig;
use serde::{Deserialize, Serialize};

use crate::domain::entities::user::User;

use super::types::{Notification, NotificationKind};

/// A rendered email ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

/// Turns notifications into emails
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    product_name: String,
    reset_url_base: String,
}

impl MessageRenderer {
    pub fn new(product_name: impl Into<String>, reset_url_base: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            reset_url_base: reset_url_base.into(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(&config.product_name, &config.password_reset_url)
    }

    /// Link the user follows to reset their password
    pub fn reset_link(&self, token: &str) -> String {
        let separator = if self.reset_url_base.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.reset_url_base, separator, token)
    }

    pub fn render(&self, notification: &Notification, user: &User) -> EmailMessage {
        let product = &self.product_name;
        let minutes = notification.valid_for_minutes;

        let (subject, action) = match notification.kind {
            NotificationKind::EmailVerificationOtp => (
                format!("Verify your email for {}", product),
                format!(
                    "Your {} verification code is {}.\n\nThe code expires in {} minutes.\n\n\
                     If you did not create an account, you can ignore this email.",
                    product, notification.secret, minutes
                ),
            ),
            NotificationKind::PasswordResetOtp => (
                format!("Your {} password reset code", product),
                format!(
                    "Use the code {} to reset your {} password.\n\nThe code expires in {} minutes.\n\n\
                     If you did not ask to reset your password, you can ignore this email.",
                    notification.secret, product, minutes
                ),
            ),
            NotificationKind::PasswordResetToken => (
                format!("Reset your {} password", product),
                format!(
                    "Follow this link to reset your {} password:\n\n{}\n\nThe link expires in {} minutes.\n\n\
                     If you did not ask to reset your password, you can ignore this email.",
                    product,
                    self.reset_link(&notification.secret),
                    minutes
                ),
            ),
        };

        EmailMessage {
            to: user.email.clone(),
            subject,
            text_body: format!(
                "Hi {},\n\n{}\n\nThe {} team\n",
                user.display_name(),
                action,
                product
            ),
        }
    }
}
