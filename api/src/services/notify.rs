use std::time::Duration;

use alert_engine::{NotificationSender, NotifyError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Hands notifications to an HTTP mail relay as JSON.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building webhook http client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                recipient,
                subject,
                body,
            })
            .send()
            .await
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery(format!("relay returned status {status}")));
        }
        info!(%recipient, %subject, "notification delivered to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[tokio::test]
    async fn posts_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_json(serde_json::json!({
                "recipient": "a@example.com",
                "subject": "Hydra Balance Increased",
                "body": "hello"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(&format!("{}/notify", server.uri()), Duration::from_secs(1)).unwrap();
        notifier
            .send("a@example.com", "Hydra Balance Increased", "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn relay_error_is_a_delivery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(&server.uri(), Duration::from_secs(1)).unwrap();
        let err = notifier.send("a@example.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, NotifyError::Delivery(msg) if msg.contains("500")));
    }
}
