use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use crate::utils::retry::{with_retry, RetryConfig};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTag {
    pub name: String,
    pub value: String,
}

/// One outbound message, shaped for the provider's send endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "reply_to", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EmailTag>>,
}

/// Outbound email capability. The dispatcher and the email endpoints talk
/// to this seam so tests can swap in a fake.
#[async_trait]
pub trait EmailSender: Send + Sync {
    fn is_configured(&self) -> bool;
    fn from_email(&self) -> &str;
    fn from_name(&self) -> &str;

    /// Default sender in `Name <email>` form.
    fn full_from(&self) -> String {
        if self.from_name().is_empty() {
            self.from_email().to_string()
        } else {
            format!("{} <{}>", self.from_name(), self.from_email())
        }
    }

    /// Send one message; returns the provider's message id.
    async fn send(&self, email: &OutboundEmail) -> Result<String>;

    /// Probe the API key by listing the account's verified domains.
    async fn verify_api_key(&self) -> Result<serde_json::Value>;
}

/// Resend-style HTTP client. Transient network and timeout failures are
/// retried with exponential backoff; provider rejections are not.
pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    from_email: String,
    from_name: String,
    retry: RetryConfig,
}

impl ResendClient {
    pub fn new(config: &EmailConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            retry: RetryConfig::default(),
        }
    }

    fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "RESEND_API_KEY no está configurada".to_string(),
            ));
        }
        Ok(())
    }

    async fn provider_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("El proveedor de email respondió {}", status.as_u16()));

        AppError::EmailProvider(message)
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

#[async_trait]
impl EmailSender for ResendClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn from_email(&self) -> &str {
        &self.from_email
    }

    fn from_name(&self) -> &str {
        &self.from_name
    }

    async fn send(&self, email: &OutboundEmail) -> Result<String> {
        self.require_api_key()?;

        let url = format!("{}/emails", self.base_url);
        let response = with_retry(&self.retry, is_transient, || {
            let request = self
                .http
                .post(url.as_str())
                .bearer_auth(&self.api_key)
                .json(email);
            async move { request.send().await }
        })
        .await
        .map_err(|e| AppError::EmailProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::EmailProvider(e.to_string()))?;

        Ok(body
            .get("id")
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn verify_api_key(&self) -> Result<serde_json::Value> {
        self.require_api_key()?;

        let url = format!("{}/domains", self.base_url);
        let response = with_retry(&self.retry, is_transient, || {
            let request = self.http.get(url.as_str()).bearer_auth(&self.api_key);
            async move { request.send().await }
        })
        .await
        .map_err(|e| AppError::EmailProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::EmailProvider(e.to_string()))?;

        Ok(body.get("data").cloned().unwrap_or(serde_json::json!([])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: &str, from_name: &str) -> ResendClient {
        ResendClient::new(&EmailConfig {
            api_key: api_key.to_string(),
            base_url: "https://api.resend.com".to_string(),
            from_email: "noreply@directiva.mx".to_string(),
            from_name: from_name.to_string(),
        })
    }

    #[test]
    fn full_from_combines_name_and_address() {
        let sender = client("key", "Hablemos Emprendimiento");
        assert_eq!(
            sender.full_from(),
            "Hablemos Emprendimiento <noreply@directiva.mx>"
        );
    }

    #[test]
    fn full_from_without_name_is_bare_address() {
        let sender = client("key", "");
        assert_eq!(sender.full_from(), "noreply@directiva.mx");
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_send() {
        let sender = client("", "");
        assert!(!sender.is_configured());

        let email = OutboundEmail {
            from: sender.full_from(),
            to: vec!["ok@example.com".to_string()],
            subject: "Hola".to_string(),
            text: Some("Hola".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            sender.send(&email).await,
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn outbound_email_omits_empty_optionals() {
        let email = OutboundEmail {
            from: "a <a@b.co>".to_string(),
            to: vec!["x@y.co".to_string()],
            subject: "s".to_string(),
            html: Some("<p>hola</p>".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&email).unwrap();
        assert!(value.get("text").is_none());
        assert!(value.get("cc").is_none());
        assert!(value.get("reply_to").is_none());
        assert_eq!(value["html"], "<p>hola</p>");
    }
}
