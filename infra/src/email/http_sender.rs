//! Transactional mail API client
//!
//! Posts each message as JSON to the configured endpoint with a bearer key:
//!
//! ```json
//! { "from": "...", "to": "...", "subject": "...", "text": "..." }
//! ```
//!
//! The provider's message id is read from an `id` or `message_id` field of
//! the response when present.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use kg_core::services::notification::{EmailMessage, EmailSender, NotificationError};
use kg_shared::email::mask_email;

use crate::config::NotificationConfig;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// HTTP mail API sender
#[derive(Clone)]
pub struct HttpEmailSender {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailSender {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from_address: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from_address: from_address.into(),
        })
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self, InfrastructureError> {
        if config.api_url.is_empty() {
            return Err(InfrastructureError::Config(
                "notification.api_url is required for the http provider".to_string(),
            ));
        }
        Self::new(
            &config.api_url,
            &config.api_key,
            &config.from_address,
            Duration::from_secs(config.request_timeout),
        )
    }

    fn message_id_from(body: &serde_json::Value) -> Option<String> {
        ["id", "message_id"]
            .iter()
            .find_map(|field| body.get(field).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        let mut request = self.http.post(&self.api_url).json(&SendEmailRequest {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            text: &message.text_body,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "email_sender",
                provider = "http",
                to = %mask_email(&message.to),
                status = status.as_u16(),
                "Mail API rejected message"
            );
            return Err(NotificationError::Delivery(format!(
                "mail API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        let message_id = Self::message_id_from(&body).unwrap_or_else(|| "unknown".to_string());

        tracing::debug!(
            target: "email_sender",
            provider = "http",
            to = %mask_email(&message.to),
            message_id = %message_id,
            "Mail API accepted message"
        );

        Ok(message_id)
    }
}
