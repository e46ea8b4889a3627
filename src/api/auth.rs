use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::bearer_token;
use crate::services::AuthService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|_| AppError::BadRequest("Usuario y contraseña son requeridos".to_string()))?;

    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let (admin, token) = auth_service.login(&payload.username, &payload.password).await?;

    tracing::info!(admin_id = %admin.id, username = %admin.username, "admin logged in");

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": admin,
    })))
}

async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    let token = bearer_token(&headers)?;

    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let admin = auth_service.verify_token(token).await?;

    Ok(Json(json!({
        "success": true,
        "user": admin,
    })))
}
