use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{DeliveryMethod, Notification, Notifier};
use crate::DeliveryError;

/// Таймаут одного запроса вебхука.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Способность доставить уведомление одному получателю.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<(), DeliveryError>;
}

/// Доставка в журнал (`tracing`).
#[derive(Debug, Clone)]
pub struct LogDelivery {
    call: String,
}

/// Доставка POST-запросом с JSON-телом.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    call: String,
    url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    to: &'a str,
    kind: &'a str,
    text: &'a str,
}

impl LogDelivery {
    pub fn new(call: impl Into<String>) -> Self {
        Self { call: call.into() }
    }
}

#[async_trait]
impl Deliver for LogDelivery {
    async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        info!(
            to = %self.call,
            kind = %notification.kind,
            text = %notification.text,
            "Notification"
        );
        Ok(())
    }
}

impl WebhookDelivery {
    pub fn new(
        call: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            call: call.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl Deliver for WebhookDelivery {
    async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        let payload = WebhookPayload {
            to: &self.call,
            kind: &notification.kind,
            text: &notification.text,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Строит реализацию доставки по описанию из конфигурации.
pub fn build_delivery(
    notifier: &Notifier,
    client: &reqwest::Client,
) -> Arc<dyn Deliver> {
    match &notifier.method {
        DeliveryMethod::Log => Arc::new(LogDelivery::new(&notifier.call)),
        DeliveryMethod::Webhook { url } => {
            Arc::new(WebhookDelivery::new(&notifier.call, url, client.clone()))
        }
    }
}
