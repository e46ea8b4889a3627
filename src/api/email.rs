use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::services::{parse_custom_emails, EmailTag, OutboundEmail};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(email_config))
        .route("/send", post(send_email))
}

/// Recipient fields accept a single address or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: Option<OneOrMany>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Option<OneOrMany>,
    pub bcc: Option<OneOrMany>,
    pub tags: Option<Vec<EmailTag>>,
}

async fn email_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sender = &state.email;

    if !sender.is_configured() {
        return Json(json!({
            "configured": false,
            "error": "RESEND_API_KEY no está configurada. Agrega RESEND_API_KEY a la configuración del servicio",
            "fromEmail": serde_json::Value::Null,
            "fromName": serde_json::Value::Null,
        }));
    }

    let from_email = sender.from_email().to_string();
    let from_name = sender.from_name().to_string();
    let full_from = sender.full_from();

    match sender.verify_api_key().await {
        Ok(domains) => Json(json!({
            "configured": true,
            "fromEmail": from_email,
            "fromName": from_name,
            "fullFrom": full_from,
            "domains": domains,
            "apiKeyValid": true,
        })),
        Err(e) => Json(json!({
            "configured": true,
            "fromEmail": from_email,
            "fromName": from_name,
            "fullFrom": full_from,
            "apiKeyValid": false,
            "error": e.to_string(),
        })),
    }
}

async fn send_email(
    State(state): State<AppState>,
    Json(payload): Json<SendEmailRequest>,
) -> Result<Json<serde_json::Value>> {
    let to = payload.to.ok_or_else(missing_field_error)?;
    let subject = payload
        .subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(missing_field_error)?;
    if payload.html.is_none() && payload.text.is_none() {
        return Err(missing_field_error());
    }

    // Free-text entries go through the same validation and deduplication
    // as the bulk flows; invalid addresses are dropped, not reported.
    let recipients = parse_custom_emails(&to.into_vec().join("\n"));
    if recipients.is_empty() {
        return Err(AppError::NoRecipients);
    }

    let outbound = OutboundEmail {
        from: payload.from.unwrap_or_else(|| state.email.full_from()),
        to: recipients.clone(),
        subject,
        html: payload.html,
        text: payload.text,
        reply_to: payload.reply_to,
        cc: payload.cc.map(OneOrMany::into_vec),
        bcc: payload.bcc.map(OneOrMany::into_vec),
        tags: payload.tags,
    };

    let id = state.email.send(&outbound).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "id": id },
        "message": format!("Email enviado exitosamente a {} destinatario(s)", recipients.len()),
    })))
}

fn missing_field_error() -> AppError {
    AppError::BadRequest("Faltan campos obligatorios: to, subject y (html o text)".to_string())
}
