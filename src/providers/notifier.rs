//! Outbound alert delivery
//!
//! The pipeline hands every finished case's `AlertNotification` to a
//! `Notifier`. Delivery problems are the notifier's to report; the caller
//! logs them and moves on.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::config::TelegramConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::AlertNotification;
use crate::utils::constants::TELEGRAM_API_URL;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, alert: &AlertNotification) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts alerts to a chat through the Bot API `sendMessage`
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, timeout: Duration) -> AppResult<Self> {
        Self::with_api_url(config, TELEGRAM_API_URL, timeout)
    }

    pub fn with_api_url(config: TelegramConfig, api_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::from)?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            config,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, alert: &AlertNotification) -> AppResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.config.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": alert.render(),
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body: TelegramResponse = response.json().await.map_err(|e| {
            AppError::notify_failed(format!("Telegram returned HTTP {} ({})", status.as_u16(), e))
        })?;

        if !body.ok {
            return Err(AppError::notify_failed(format!(
                "Telegram rejected message: {}",
                body.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        debug!("📨 Telegram accepted alert for {}", alert.wallet_address_short);
        info!("✅ Alert sent to Telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert() -> AlertNotification {
        AlertNotification {
            wallet_address_short: "0x3f5c...f0be".to_string(),
            verdict_upper: "LIKELY FRAUD".to_string(),
            risk_score_percent: 91,
        }
    }

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::with_api_url(
            TelegramConfig {
                bot_token: "123:abc".to_string(),
                chat_id: "42".to_string(),
            },
            &server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({ "chat_id": "42" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server).notify(&alert()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_message_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = notifier(&server).notify(&alert()).await.unwrap_err();
        assert_eq!(err.code_str(), "NOTIFY_FAILED");
        assert!(err.message.contains("chat not found"));
    }
}
