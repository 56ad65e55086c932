//! Notification fan-out client over HTTP

use crate::error::{ApprovalError, Result};
use crate::workflow::Notifier;
use approval_types::{DeliveryOutcome, EmployeeId, NotificationPayload, NotifyRequest, NotifyResponse};
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpNotifier {
    client: Client,
    notify_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: &str) -> Self {
        let notify_url = format!("{}/notify", base_url.trim_end_matches('/'));
        log::info!("HttpNotifier posting to {}", notify_url);

        Self {
            client: Client::new(),
            notify_url,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, target: EmployeeId, payload: NotificationPayload) -> Result<DeliveryOutcome> {
        let body = NotifyRequest {
            target_id: target,
            payload: serde_json::to_value(&payload)?,
        };

        let response = self
            .client
            .post(&self.notify_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApprovalError::upstream("notification service", e))?;

        if !response.status().is_success() {
            return Err(ApprovalError::upstream(
                "notification service",
                format!("POST {} answered {}", self.notify_url, response.status()),
            ));
        }

        let parsed: NotifyResponse = response.json().await?;
        Ok(parsed.status)
    }
}
