use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored in-app notification row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}
