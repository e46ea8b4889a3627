use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Mentor row from the platform's `mentores` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub verified: bool,
}
