//! Tests for notification queueing, rendering and delivery

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::repositories::memory::InMemoryUserRepository;
use crate::repositories::UserRepository;
use crate::services::notification::{
    ChannelNotificationQueue, DeliveryStats, EmailMessage, EmailSender, MessageRenderer,
    Notification, NotificationError, NotificationKind, NotificationQueue, NotificationWorker,
};

/// Sender that records messages, optionally failing every send
#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        if self.fail {
            return Err(NotificationError::Delivery("provider unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(format!("msg-{}", Uuid::new_v4()))
    }
}

fn user() -> User {
    User::new(
        "ada@example.com".to_string(),
        "Ada".to_string(),
        "Lovelace".to_string(),
        String::new(),
        Utc::now(),
    )
}

fn notification(purpose: Purpose, user_id: Uuid, secret: &str, ttl_minutes: i64) -> Notification {
    let record = VerificationRecord::new(
        user_id,
        purpose,
        secret.to_string(),
        Duration::minutes(ttl_minutes),
        Utc::now(),
    );
    Notification::for_record(&record)
}

fn renderer() -> MessageRenderer {
    MessageRenderer::new("Keygate", "https://app.example.com/reset")
}

#[test]
fn test_notification_from_record() {
    let user_id = Uuid::new_v4();
    let n = notification(Purpose::PasswordResetOtp, user_id, "004213", 15);

    assert_eq!(n.kind, NotificationKind::PasswordResetOtp);
    assert_eq!(n.user_id, user_id);
    assert_eq!(n.valid_for_minutes, 15);
    assert!(!format!("{:?}", n).contains("004213"));
}

#[test]
fn test_render_email_verification_otp() {
    let user = user();
    let message = renderer().render(
        &notification(Purpose::EmailVerification, user.id, "042917", 15),
        &user,
    );

    assert_eq!(message.to, "ada@example.com");
    assert_eq!(message.subject, "Verify your email for Keygate");
    assert!(message.text_body.starts_with("Hi Ada,"));
    assert!(message.text_body.contains("042917"));
    assert!(message.text_body.contains("15 minutes"));
}

#[test]
fn test_render_reset_token_link() {
    let user = user();
    let token = "A".repeat(43);
    let message = renderer().render(
        &notification(Purpose::PasswordResetToken, user.id, &token, 60),
        &user,
    );

    assert_eq!(message.subject, "Reset your Keygate password");
    assert!(message
        .text_body
        .contains(&format!("https://app.example.com/reset?token={}", token)));
    assert!(message.text_body.contains("60 minutes"));

    let with_query = MessageRenderer::new("Keygate", "https://app.example.com/reset?lang=en");
    assert_eq!(
        with_query.reset_link("abc"),
        "https://app.example.com/reset?lang=en&token=abc"
    );
}

#[tokio::test]
async fn test_queue_full_and_closed() {
    let (queue, receiver) = ChannelNotificationQueue::new(1);
    let user_id = Uuid::new_v4();

    queue
        .enqueue(notification(Purpose::EmailVerification, user_id, "111111", 15))
        .unwrap();
    assert_eq!(
        queue.enqueue(notification(Purpose::EmailVerification, user_id, "222222", 15)),
        Err(NotificationError::QueueFull)
    );

    drop(receiver);
    assert_eq!(
        queue.enqueue(notification(Purpose::EmailVerification, user_id, "333333", 15)),
        Err(NotificationError::QueueClosed)
    );
}

#[tokio::test]
async fn test_worker_delivers_and_stops_when_queue_dropped() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users.create(user()).await.unwrap();
    let sender = Arc::new(RecordingSender::default());

    let (queue, receiver) = ChannelNotificationQueue::new(8);
    let worker = NotificationWorker::new(receiver, users.clone(), sender.clone(), renderer());
    let handle = worker.spawn();

    queue
        .enqueue(notification(Purpose::EmailVerification, user.id, "123456", 15))
        .unwrap();
    queue
        .enqueue(notification(Purpose::PasswordResetOtp, Uuid::new_v4(), "654321", 15))
        .unwrap();
    drop(queue);

    let stats = handle.await.unwrap();
    assert_eq!(stats, DeliveryStats { delivered: 1, failed: 1 });

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text_body.contains("123456"));
}

#[tokio::test]
async fn test_worker_swallows_send_failures() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users.create(user()).await.unwrap();
    let sender = Arc::new(RecordingSender {
        fail: true,
        ..Default::default()
    });

    let (queue, receiver) = ChannelNotificationQueue::new(8);
    for secret in ["111111", "222222"] {
        queue
            .enqueue(notification(Purpose::EmailVerification, user.id, secret, 15))
            .unwrap();
    }
    drop(queue);

    let stats = NotificationWorker::new(receiver, users, sender, renderer())
        .run()
        .await;
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.failed, 2);
}
