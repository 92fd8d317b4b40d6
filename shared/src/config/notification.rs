//! Outbound email notification configuration

use serde::{Deserialize, Serialize};

/// Which mail transport the notification worker hands messages to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Log messages instead of sending them
    Log,
    /// JSON POST to a transactional mail HTTP API
    Http,
}

/// Notification queue and message settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Capacity of the in-process dispatch queue
    pub queue_capacity: usize,

    /// Sender address
    pub from_address: String,

    /// Product name used in subjects and signatures
    pub product_name: String,

    /// Base URL of the password reset page; the token is appended as a query parameter
    pub password_reset_url: String,

    /// Mail transport
    pub provider: MailProvider,

    /// HTTP API endpoint (provider = http)
    pub api_url: String,

    /// HTTP API key (provider = http)
    pub api_key: String,

    /// HTTP request timeout in seconds
    pub request_timeout: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            from_address: String::from("no-reply@keygate.local"),
            product_name: String::from("Keygate"),
            password_reset_url: String::from("http://localhost:3000/password-reset"),
            provider: MailProvider::Log,
            api_url: String::new(),
            api_key: String::new(),
            request_timeout: 10,
        }
    }
}
