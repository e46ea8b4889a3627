use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authenticated admin principal.
///
/// Loaded from the store on login and re-fetched on every token
/// verification; the token payload alone is never trusted for
/// active-status. Carries no password fields, so it can be serialized
/// straight into responses.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
}
