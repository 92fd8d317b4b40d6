use kg_core::services::notification::{EmailMessage, EmailSender};

use crate::config::{MailProvider, NotificationConfig};
use crate::email::{create_email_sender, LogEmailSender};

fn message() -> EmailMessage {
    EmailMessage {
        to: "ursula@example.com".to_string(),
        subject: "Verify your email for Keygate".to_string(),
        text_body: "Hi Ursula,\n\nYour code is 123456.".to_string(),
    }
}

#[tokio::test]
async fn test_log_sender_counts_messages() {
    let sender = LogEmailSender::new();

    let first = sender.send_email(&message()).await.unwrap();
    let second = sender.send_email(&message()).await.unwrap();

    assert!(first.starts_with("log_"));
    assert_ne!(first, second);
    assert_eq!(sender.get_message_count(), 2);
}

#[tokio::test]
async fn test_clones_share_the_counter() {
    let sender = LogEmailSender::with_console_output(false);
    let clone = sender.clone();

    clone.send_email(&message()).await.unwrap();
    assert_eq!(sender.get_message_count(), 1);
}

#[test]
fn test_provider_selection() {
    let config = NotificationConfig::default();
    assert!(create_email_sender(&config, false).is_ok());

    let http = NotificationConfig {
        provider: MailProvider::Http,
        ..NotificationConfig::default()
    };
    assert!(create_email_sender(&http, false).is_err());

    let http = NotificationConfig {
        api_url: "http://127.0.0.1:9/send".to_string(),
        ..http
    };
    assert!(create_email_sender(&http, false).is_ok());
}
