//! HttpEmailSender against a one-shot local HTTP server

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use kg_core::services::notification::{EmailMessage, EmailSender, NotificationError};

use crate::email::HttpEmailSender;

/// Serve one request with `status` and `body`, returning the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/send", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

fn message() -> EmailMessage {
    EmailMessage {
        to: "ursula@example.com".to_string(),
        subject: "Your Keygate password reset code".to_string(),
        text_body: "Hi Ursula,\n\nYour code is 654321.".to_string(),
    }
}

#[tokio::test]
async fn test_posts_json_with_bearer_key() {
    let (url, server) = serve_once("200 OK", r#"{"id":"msg_42"}"#).await;
    let sender = HttpEmailSender::new(
        url,
        "test-api-key",
        "no-reply@keygate.local",
        Duration::from_secs(5),
    )
    .unwrap();

    let message_id = sender.send_email(&message()).await.unwrap();
    assert_eq!(message_id, "msg_42");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/send"));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer test-api-key"));
    assert!(request.contains(r#""to":"ursula@example.com""#));
    assert!(request.contains(r#""from":"no-reply@keygate.local""#));
}

#[tokio::test]
async fn test_rejection_is_a_delivery_error() {
    let (url, server) = serve_once("422 Unprocessable Entity", r#"{"error":"bad recipient"}"#).await;
    let sender =
        HttpEmailSender::new(url, "", "no-reply@keygate.local", Duration::from_secs(5)).unwrap();

    let result = sender.send_email(&message()).await;
    match result {
        Err(NotificationError::Delivery(reason)) => {
            assert!(reason.contains("422"));
            assert!(reason.contains("bad recipient"));
        }
        other => panic!("expected delivery error, got {:?}", other),
    }

    let request = server.await.unwrap();
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_unreachable_api_is_a_delivery_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/send", listener.local_addr().unwrap());
    drop(listener);

    let sender =
        HttpEmailSender::new(url, "key", "no-reply@keygate.local", Duration::from_secs(2)).unwrap();
    assert!(matches!(
        sender.send_email(&message()).await,
        Err(NotificationError::Delivery(_))
    ));
}
