//! Operation Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Free-form work item a user records from the bot menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: Option<RecordId>,
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl OperationRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}
