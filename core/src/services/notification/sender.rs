use async_trait::async_trait;

use super::message::EmailMessage;
use super::types::NotificationError;

/// Email transport
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a message, returning the provider's message id
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError>;
}
