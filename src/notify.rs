use async_trait::async_trait;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::{EmailConfig, MonitorConfig};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),
    #[error("webhook responded with {0}")]
    WebhookStatus(reqwest::StatusCode),
    #[error("{failed} of {total} notification transports failed")]
    Partial { failed: usize, total: usize },
}

/// Delivers a "target went down" alert.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, target: &str) -> Result<(), NotifyError>;
}

pub struct EmailSink {
    sender: Mailbox,
    recipient: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailSink {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let sender = parse_mailbox(&config.sender)?;
        let recipient = parse_mailbox(&config.recipient)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.sender.clone(), config.password.clone()))
            .build();
        Ok(Self { sender, recipient, mailer })
    }

    fn message(&self, target: &str) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(format!("Website Down: {target}"))
            .header(ContentType::TEXT_PLAIN)
            .body(format!("The website {target} is currently down.\r\n"))?;
        Ok(message)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

#[async_trait]
impl NotificationSink for EmailSink {
    async fn notify(&self, target: &str) -> Result<(), NotifyError> {
        let message = self.message(target)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

/// Posts an embed-style JSON payload to a chat webhook.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { url: url.into(), client }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, target: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "username": "Uptime Monitor",
            "embeds": [{
                "title": "Website Down",
                "color": 0xE74C3C,
                "fields": [
                    { "name": "Website", "value": target, "inline": true },
                    { "name": "Status", "value": "Down", "inline": true }
                ],
                "timestamp": Utc::now().to_rfc3339(),
            }]
        });
        let resp = self.client.post(&self.url).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(NotifyError::WebhookStatus(resp.status()));
        }
        Ok(())
    }
}

/// Fallback when no transport is configured.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, target: &str) -> Result<(), NotifyError> {
        warn!(url = target, "Website went down (no notification transport configured)");
        Ok(())
    }
}

/// Notifies every transport in turn; fails if any of them does.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl NotificationSink for FanoutSink {
    async fn notify(&self, target: &str) -> Result<(), NotifyError> {
        let mut failed = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(target).await {
                error!(url = target, error = %e, "Notification transport failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(NotifyError::Partial { failed, total: self.sinks.len() });
        }
        Ok(())
    }
}

pub fn sink_from_config(config: &MonitorConfig) -> Result<Arc<dyn NotificationSink>, NotifyError> {
    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();
    if let Some(email) = &config.email {
        sinks.push(Arc::new(EmailSink::new(email)?));
    }
    if let Some(url) = &config.webhook_url {
        let client = reqwest::Client::builder()
            .timeout(config.notify_timeout())
            .build()?;
        sinks.push(Arc::new(WebhookSink::new(url.clone(), client)));
    }

    Ok(match sinks.len() {
        0 => Arc::new(LogSink),
        1 => sinks.remove(0),
        _ => Arc::new(FanoutSink::new(sinks)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            sender: "monitor@example.com".into(),
            password: "secret".into(),
            recipient: "ops@example.com".into(),
        }
    }

    #[tokio::test]
    async fn email_message_has_down_subject() {
        let sink = EmailSink::new(&email_config()).unwrap();
        let raw = String::from_utf8(sink.message("https://a.com").unwrap().formatted()).unwrap();
        assert!(raw.contains("Subject: Website Down: https://a.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("The website https://a.com is currently down."));
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let mut config = email_config();
        config.recipient = "not-an-address".into();
        assert!(matches!(EmailSink::new(&config), Err(NotifyError::Address { .. })));
    }

    #[tokio::test]
    async fn webhook_posts_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({ "username": "Uptime Monitor" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri()), reqwest::Client::new());
        sink.notify("https://a.com").await.unwrap();
    }

    #[tokio::test]
    async fn webhook_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), reqwest::Client::new());
        let err = sink.notify("https://a.com").await.unwrap_err();
        assert!(matches!(err, NotifyError::WebhookStatus(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn fanout_attempts_every_sink() {
        let ok = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&ok)
            .await;
        let broken = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&broken)
            .await;

        let client = reqwest::Client::new();
        let sink = FanoutSink::new(vec![
            Arc::new(WebhookSink::new(broken.uri(), client.clone())),
            Arc::new(WebhookSink::new(ok.uri(), client)),
        ]);
        let err = sink.notify("https://a.com").await.unwrap_err();
        assert!(matches!(err, NotifyError::Partial { failed: 1, total: 2 }));
    }

    #[tokio::test]
    async fn no_transport_falls_back_to_log() {
        let config = MonitorConfig::from_json(r#"{"websites":["a.com"]}"#).unwrap();
        let sink = sink_from_config(&config).unwrap();
        assert!(sink.notify("a.com").await.is_ok());
    }

    #[tokio::test]
    async fn payload_does_not_claim_previous_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{ "fields": [
                    { "name": "Website", "value": "https://a.com" },
                    { "name": "Status", "value": "Down" }
                ]}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), reqwest::Client::new());
        sink.notify("https://a.com").await.unwrap();
    }

    #[tokio::test]
    async fn configured_webhook_gives_up_on_silent_endpoint() {
        // accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _accepted = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = MonitorConfig::from_json(&format!(
            r#"{{"websites":["a.com"],"webhook_url":"http://{addr}/hook","notify_timeout_ms":300}}"#
        ))
        .unwrap();
        let sink = sink_from_config(&config).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), sink.notify("a.com"))
            .await
            .expect("webhook client has no timeout");
        assert!(matches!(result, Err(NotifyError::Webhook(_))));
    }
}
