use std::time::Duration;

use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::utils::retry::{with_retry, RetryConfig};

/// The main application can take a while to walk its caches; this proxy
/// waits longer than the regular outbound calls.
const CLEAR_TIMEOUT: Duration = Duration::from_secs(60);

/// Body forwarded to the main application's cache-clear endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_all: Option<bool>,
}

/// Proxy for per-user cache invalidation in the main application. The
/// admin token travels along so the main app can authorize the call.
pub struct CacheProxy {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl CacheProxy {
    pub fn new(main_app_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: main_app_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        }
    }

    pub async fn clear_user(
        &self,
        admin_token: &str,
        request: &ClearCacheRequest,
        request_id: Uuid,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/api/cache/clear", self.base_url);
        tracing::info!(%request_id, %url, "forwarding cache clear to main app");

        let response = with_retry(&self.retry, is_transient, || {
            let call = self
                .http
                .post(url.as_str())
                .timeout(CLEAR_TIMEOUT)
                .header("X-Admin-Token", admin_token)
                .header(reqwest::header::USER_AGENT, "Panel-Control/1.0")
                .json(request);
            async move { call.send().await }
        })
        .await
        .map_err(|e| map_network_error(&e, &self.base_url))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));

        if !status.is_success() {
            let message = payload
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "Error al limpiar caché en la app principal (status: {})",
                        status.as_u16()
                    )
                });

            // Upstream 4xx relays as-is; anything else is our 500.
            let relayed = if status.is_client_error() {
                StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };

            tracing::error!(%request_id, status = status.as_u16(), %message, "main app rejected cache clear");
            return Err(AppError::Upstream {
                status: relayed,
                message,
            });
        }

        Ok(payload)
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

fn map_network_error(e: &reqwest::Error, base_url: &str) -> AppError {
    let (status, message) = if e.is_timeout() {
        (
            StatusCode::GATEWAY_TIMEOUT,
            "Timeout al conectar con la app principal. El servicio puede estar sobrecargado o no disponible."
                .to_string(),
        )
    } else if e.is_connect() {
        (
            StatusCode::BAD_GATEWAY,
            format!(
                "No se pudo conectar con la app principal. Verifica que el servicio esté disponible en {}",
                base_url
            ),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Error de red al conectar con la app principal: {}", e),
        )
    };

    AppError::Upstream { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_omits_absent_fields() {
        let request = ClearCacheRequest {
            user_id: Some("u-1".to_string()),
            user_email: None,
            clear_all: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["userId"], "u-1");
        assert!(value.get("userEmail").is_none());
        assert!(value.get("clearAll").is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let proxy = CacheProxy::new("https://app.example.com/");
        assert_eq!(proxy.base_url, "https://app.example.com");
    }
}
