use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ACCOUNT_TYPE_FREE: &str = "free";
pub const ACCOUNT_TYPE_PRO: &str = "pro";

/// Platform user as seen by the admin panel (active, non-deleted rows only).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub account_type: String,
    pub is_active: bool,
}

impl User {
    pub fn is_pro(&self) -> bool {
        self.account_type == ACCOUNT_TYPE_PRO
    }
}
