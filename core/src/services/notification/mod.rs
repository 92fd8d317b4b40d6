//! Outbound notifications for issued codes and tokens
//!
//! Issuance hands a [`Notification`] to a [`NotificationQueue`] without
//! waiting; a [`NotificationWorker`] drains the queue, renders the email and
//! passes it to an [`EmailSender`]. Delivery is best-effort.

mod message;
mod queue;
mod sender;
mod types;
mod worker;

#[cfg(test)]
mod tests;

pub use message::{EmailMessage, MessageRenderer};
pub use queue::{ChannelNotificationQueue, NotificationQueue};
pub use sender::EmailSender;
pub use types::{Notification, NotificationError, NotificationKind};
pub use worker::{DeliveryStats, NotificationWorker};
