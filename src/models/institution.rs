use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const INSTITUTION_STATUSES: [&str; 4] = ["pendiente", "aprobado", "rechazado", "suspendido"];

/// Institution partnership request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub institution_type: String,
    pub country: String,
    pub city: String,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub contact_name: String,
    pub contact_title: String,
    pub email: String,
    pub phone: Option<String>,
    pub estimated_users: Option<i32>,
    pub description: Option<String>,
    pub status: String,
    pub max_users: i32,
    pub active_users: i32,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInstitution {
    pub status: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub max_users: Option<i32>,
}
