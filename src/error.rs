use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy for the admin panel API.
///
/// Client-facing messages are Spanish, matching what the panel UI shows to
/// operators. Store and provider message text is included in responses on
/// purpose: this is an internal tool and the operators are the ones
/// diagnosing failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Token no proporcionado")]
    MissingToken,

    #[error("Token inválido o expirado")]
    InvalidToken,

    #[error("Token inválido: no es un token de administrador")]
    WrongTokenType,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Usuario no encontrado o inactivo")]
    PrincipalInactive,

    #[error("Función de autenticación no configurada. Contacta al administrador.")]
    AuthNotConfigured,

    #[error("No hay destinatarios válidos")]
    NoRecipients,

    #[error("Recurso no encontrado: {0}")]
    NotFound(String),

    #[error("Configuración del servidor incorrecta")]
    Configuration(String),

    /// Failure of an outbound call to the main application. The status is
    /// chosen by the caller (502/503/504 for connectivity, relayed 4xx for
    /// upstream rejections).
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Error de base de datos: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error al enviar el email: {0}")]
    EmailProvider(String),

    #[error("Error interno del servidor")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::WrongTokenType
            | AppError::InvalidCredentials
            | AppError::PrincipalInactive => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::AuthNotConfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::NoRecipients => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Configuration(detail) => {
                tracing::error!("configuration error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Upstream { status, message } => (*status, message.clone()),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::EmailProvider(msg) => {
                tracing::error!("email provider error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
