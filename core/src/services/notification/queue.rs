//! Non-blocking notification queue

use tokio::sync::mpsc::{self, error::TrySendError};

use super::types::{Notification, NotificationError};

/// Hand-off point between issuance and delivery
///
/// `enqueue` must return immediately; callers log failures and move on.
pub trait NotificationQueue: Send + Sync {
    fn enqueue(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Bounded tokio channel feeding a [`super::NotificationWorker`]
#[derive(Debug, Clone)]
pub struct ChannelNotificationQueue {
    sender: mpsc::Sender<Notification>,
}

impl ChannelNotificationQueue {
    /// Create a queue and the receiver the worker consumes
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl NotificationQueue for ChannelNotificationQueue {
    fn enqueue(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sender.try_send(notification).map_err(|e| match e {
            TrySendError::Full(_) => NotificationError::QueueFull,
            TrySendError::Closed(_) => NotificationError::QueueClosed,
        })
    }
}
