//! Background delivery of queued notifications

use kg_shared::email::mask_email;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::repositories::UserRepository;

use super::message::{EmailMessage, MessageRenderer};
use super::sender::EmailSender;
use super::types::{Notification, NotificationError};

/// Counters returned when the worker stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Drains a notification queue until every sender handle is dropped
pub struct NotificationWorker<U, E>
where
    U: UserRepository,
    E: EmailSender + ?Sized,
{
    receiver: mpsc::Receiver<Notification>,
    users: Arc<U>,
    sender: Arc<E>,
    renderer: MessageRenderer,
}

impl<U, E> NotificationWorker<U, E>
where
    U: UserRepository + 'static,
    E: EmailSender + ?Sized + 'static,
{
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        users: Arc<U>,
        sender: Arc<E>,
        renderer: MessageRenderer,
    ) -> Self {
        Self {
            receiver,
            users,
            sender,
            renderer,
        }
    }

    /// Run the worker on the tokio runtime
    pub fn spawn(self) -> JoinHandle<DeliveryStats> {
        tokio::spawn(self.run())
    }

    /// Process notifications until the queue closes
    pub async fn run(mut self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();

        while let Some(notification) = self.receiver.recv().await {
            match self.deliver(&notification).await {
                Ok(message_id) => {
                    stats.delivered += 1;
                    tracing::info!(
                        user_id = %notification.user_id,
                        kind = notification.kind.as_str(),
                        message_id = %message_id,
                        event = "notification_sent",
                        "Verification email sent"
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!(
                        user_id = %notification.user_id,
                        kind = notification.kind.as_str(),
                        error = %e,
                        event = "notification_failed",
                        "Failed to deliver verification email"
                    );
                }
            }
        }

        tracing::debug!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Notification queue closed, worker stopping"
        );
        stats
    }

    async fn deliver(&self, notification: &Notification) -> Result<String, NotificationError> {
        let message = self.prepare(notification).await?;
        tracing::debug!(
            to = %mask_email(&message.to),
            subject = %message.subject,
            "Sending notification email"
        );
        self.sender.send_email(&message).await
    }

    async fn prepare(&self, notification: &Notification) -> Result<EmailMessage, NotificationError> {
        let user = self
            .users
            .find_by_id(notification.user_id)
            .await
            .map_err(|e| NotificationError::Delivery(format!("user lookup failed: {}", e)))?
            .ok_or_else(|| NotificationError::Delivery("user no longer exists".to_string()))?;

        Ok(self.renderer.render(notification, &user))
    }
}
