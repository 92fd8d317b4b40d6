//! Email transport that only logs
//!
//! Used in development and tests. Messages are counted and logged without
//! their body; the body is printed to stdout only when console output is on.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use kg_core::services::notification::{EmailMessage, EmailSender, NotificationError};
use kg_shared::email::mask_email;

/// Logging email sender
#[derive(Clone, Default)]
pub struct LogEmailSender {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to print messages to stdout
    console_output: bool,
}

impl LogEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_console_output(console_output: bool) -> Self {
        Self {
            console_output,
            ..Self::default()
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        let message_id = format!("log_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("EMAIL #{} to {}", count, message.to);
            println!("Subject: {}", message.subject);
            println!("{}", "-".repeat(60));
            println!("{}", message.text_body);
            println!("{}\n", "=".repeat(60));
        }

        tracing::info!(
            target: "email_sender",
            provider = "log",
            to = %mask_email(&message.to),
            subject = %message.subject,
            message_id = %message_id,
            count,
            "Email logged"
        );

        Ok(message_id)
    }
}
