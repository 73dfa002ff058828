//! Telegram Bot API client: message delivery and update polling

use super::messages::{ApiResponse, SendMessageRequest, Update};
use crate::error::DeliveryError;
use crate::services::notifier::{DeliveryReport, Notifier};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub struct TelegramClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    /// Client with a fixed per-request timeout (long polls extend it per call)
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, token, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Send an HTML-formatted message to one chat
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(DeliveryError::Rejected {
                chat_id,
                description: response.description.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, DeliveryError> {
        let mut query = vec![("timeout", poll_timeout.as_secs().to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response: ApiResponse<Vec<Update>> = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .timeout(poll_timeout + Duration::from_secs(10))
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(DeliveryError::Api(response.description.unwrap_or_default()));
        }
        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn broadcast(&self, recipients: &[i64], text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for &chat_id in recipients {
            match self.send_message(chat_id, text).await {
                Ok(()) => {
                    debug!(chat_id = chat_id, "Telegram: delivered alert");
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(chat_id = chat_id, error = %e, "Telegram: delivery failed");
                    report.failed.push((chat_id, e.to_string()));
                }
            }
        }
        report
    }
}
