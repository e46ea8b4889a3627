use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{NotificationContent, NOTIFICATION_KIND_GENERAL, NOTIFICATION_PRIORITY_NORMAL};
use crate::services::{NotificationService, RecipientFilter, RecipientService};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/send", post(send_notifications))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationsRequest {
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub mentor_ids: Vec<Uuid>,
    /// Optional audience tag (`all`, `free`, `pro`, `mentors`); explicit id
    /// lists are used when absent.
    pub audience: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_metadata")]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub send_email: bool,
}

fn default_kind() -> String {
    NOTIFICATION_KIND_GENERAL.to_string()
}

fn default_priority() -> String {
    NOTIFICATION_PRIORITY_NORMAL.to_string()
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

async fn send_notifications(
    State(state): State<AppState>,
    Json(payload): Json<SendNotificationsRequest>,
) -> Result<Json<serde_json::Value>> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let (title, message) = match (title, message) {
        (Some(t), Some(m)) => (t.to_string(), m.to_string()),
        _ => {
            return Err(AppError::BadRequest(
                "Título y mensaje son obligatorios".to_string(),
            ))
        }
    };

    let filter = match payload.audience.as_deref() {
        Some(tag) => RecipientFilter::from_tag(tag)
            .ok_or_else(|| AppError::BadRequest(format!("Audiencia desconocida: {}", tag)))?,
        None => {
            if payload.user_ids.is_empty() && payload.mentor_ids.is_empty() {
                return Err(AppError::BadRequest(
                    "Debe especificar al menos un usuario o mentor".to_string(),
                ));
            }
            RecipientFilter::Specific {
                user_ids: payload.user_ids,
                mentor_ids: payload.mentor_ids,
                custom_emails: Vec::new(),
            }
        }
    };

    let recipient_service = RecipientService::new(state.db.clone());
    let audience = recipient_service.resolve_audience(&filter).await?;

    let content = NotificationContent {
        title,
        message,
        kind: payload.kind,
        priority: payload.priority,
        action_url: payload.action_url,
        expires_at: payload.expires_at,
        metadata: payload.metadata,
    };

    let request_id = Uuid::new_v4();
    let notification_service = NotificationService::new(
        Arc::new(state.db.clone()),
        state.email.clone(),
        state.config.notifications.mentor_default_type.clone(),
    );
    let outcome = notification_service
        .dispatch(&audience, &content, payload.send_email)
        .await?;

    tracing::info!(
        %request_id,
        users = outcome.users_notified,
        mentors = outcome.mentors_notified,
        email_requested = payload.send_email,
        "notifications dispatched"
    );

    let mut response = json!({
        "success": true,
        "message": "Notificaciones enviadas exitosamente",
        "counts": {
            "users": outcome.users_notified,
            "mentors": outcome.mentors_notified,
            "total": outcome.users_notified + outcome.mentors_notified,
        },
    });

    if let Some(email) = outcome.email {
        response["email"] = serde_json::to_value(email)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    }

    Ok(Json(response))
}
