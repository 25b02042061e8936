//! Transactional email API client.

use crate::domain::email::{EmailConfig, EmailMessage};
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait EmailSender {
    /// Sends one message and returns the provider's message id.
    async fn send(&self, config: &EmailConfig, message: &EmailMessage) -> Result<String>;
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

pub struct HttpEmailClient {
    client: reqwest::Client,
}

impl HttpEmailClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub(crate) fn emails_url(base_url: &str) -> String {
        format!("{}/emails", base_url.trim_end_matches('/'))
    }
}

impl Default for HttpEmailClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for HttpEmailClient {
    async fn send(&self, config: &EmailConfig, message: &EmailMessage) -> Result<String> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::EmailError("Missing API key for email provider".to_string()))?;

        let response = self
            .client
            .post(Self::emails_url(&config.base_url))
            .bearer_auth(api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::EmailError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::EmailError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| AppError::EmailError(format!("Failed to parse JSON: {}", e)))?;
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails_url() {
        assert_eq!(
            HttpEmailClient::emails_url("https://api.resend.com/"),
            "https://api.resend.com/emails"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = HttpEmailClient::new();
        let message = EmailMessage {
            from: "a@b.com".to_string(),
            to: vec!["c@d.com".to_string()],
            subject: "hi".to_string(),
            text: "body".to_string(),
        };
        let err = client.send(&EmailConfig::default(), &message).await.unwrap_err();
        assert!(matches!(err, AppError::EmailError(_)));
    }
}
