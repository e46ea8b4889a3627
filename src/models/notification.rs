use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic notification type assigned when the admin does not pick one.
/// The mentor notification taxonomy has no equivalent; the dispatcher
/// remaps it at the persistence boundary.
pub const NOTIFICATION_KIND_GENERAL: &str = "general";

pub const NOTIFICATION_PRIORITY_NORMAL: &str = "normal";

/// Semantic payload shared by user and mentor notifications.
///
/// Users and mentors persist this into two different tables with different
/// column names (`metadata` vs `data`, `read` vs `is_read`); the mapping
/// lives in the store adapter, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub priority: String,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
}
