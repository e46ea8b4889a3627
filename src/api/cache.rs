use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::is_valid_http_url;
use crate::error::{AppError, Result};
use crate::middleware::bearer_token;
use crate::services::{CacheProxy, ClearCacheRequest};
use crate::utils::{is_valid_email, sanitize_input};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/clear-user", post(clear_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearUserCacheRequest {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub clear_all: Option<bool>,
}

async fn clear_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ClearUserCacheRequest>,
) -> Result<impl IntoResponse> {
    let request_id = Uuid::new_v4();

    let main_app_url = &state.config.main_app.url;
    if main_app_url.is_empty() || !is_valid_http_url(main_app_url) {
        return Err(AppError::Configuration(format!(
            "MAIN_APP__URL no configurada o inválida: {:?}",
            main_app_url
        )));
    }

    // The auth middleware already validated this token; it is re-read here
    // so the main app can authorize the forwarded call.
    let token = bearer_token(&headers)?;

    if payload.user_id.is_none() && !payload.clear_all.unwrap_or(false) {
        return Err(AppError::BadRequest(
            "Se requiere userId o clearAll=true".to_string(),
        ));
    }

    let user_id = match payload.user_id {
        Some(id) => {
            let id = sanitize_input(&id);
            if Uuid::parse_str(&id).is_err() && id.len() > 100 {
                return Err(AppError::BadRequest("Formato de userId inválido".to_string()));
            }
            Some(id)
        }
        None => None,
    };

    let user_email = match payload.user_email {
        Some(email) => {
            let email = sanitize_input(&email);
            if !is_valid_email(&email) {
                return Err(AppError::BadRequest("Formato de email inválido".to_string()));
            }
            Some(email)
        }
        None => None,
    };

    let proxy = CacheProxy::new(main_app_url);
    let data = proxy
        .clear_user(
            token,
            &ClearCacheRequest {
                user_id,
                user_email,
                clear_all: payload.clear_all,
            },
            request_id,
        )
        .await?;

    tracing::info!(%request_id, "cache cleared through main app");

    let body = Json(json!({
        "success": true,
        "message": "Caché limpiado exitosamente",
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    }));

    Ok((
        StatusCode::OK,
        [("X-Request-ID", request_id.to_string())],
        body,
    ))
}
