use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::AuthService;
use crate::AppState;

/// Signed credential payload. `type` must be `"admin"`; tokens minted for
/// other audiences are rejected even when structurally valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: usize,
    pub exp: usize,
}

/// Principal attached to request extensions once the auth gate passes.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Extract the token from a `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AppError::MissingToken)?;

    if token.is_empty() {
        return Err(AppError::MissingToken);
    }

    Ok(token)
}

/// Auth gate for protected routes: validates the bearer credential and
/// re-checks the principal's active status against the store.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())?.to_string();

    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let admin = auth_service.verify_token(&token).await?;

    request.extensions_mut().insert(CurrentAdmin {
        id: admin.id,
        username: admin.username,
        email: admin.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::MissingToken)));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_token(&headers), Err(AppError::MissingToken)));
    }

    #[test]
    fn rejects_empty_bearer_value() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(AppError::MissingToken)));
    }
}
