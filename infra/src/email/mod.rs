//! Email transports
//!
//! The notification worker renders messages in `kg_core`; these types only
//! move them. Pick one with [`create_email_sender`] from the configured
//! [`MailProvider`].

pub mod http_sender;
pub mod log_sender;

#[cfg(test)]
mod tests;

pub use http_sender::HttpEmailSender;
pub use log_sender::LogEmailSender;

use kg_core::services::notification::EmailSender;
use std::sync::Arc;

use crate::config::{MailProvider, NotificationConfig};
use crate::InfrastructureError;

/// Create the email sender selected by configuration
///
/// `console_output` only affects the log transport; it prints full messages,
/// codes included, and is meant for local development.
pub fn create_email_sender(
    config: &NotificationConfig,
    console_output: bool,
) -> Result<Arc<dyn EmailSender>, InfrastructureError> {
    match config.provider {
        MailProvider::Log => {
            tracing::info!(provider = "log", "Emails will be logged, not delivered");
            Ok(Arc::new(LogEmailSender::with_console_output(console_output)))
        }
        MailProvider::Http => {
            tracing::info!(provider = "http", api_url = %config.api_url, "Using HTTP mail API");
            Ok(Arc::new(HttpEmailSender::from_config(config)?))
        }
    }
}
