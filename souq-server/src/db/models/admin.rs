//! Admin Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Member of the dynamic admin set, keyed by Telegram user id.
///
/// The owner (`ADMIN_ID` from config) is always an admin regardless of this
/// table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: Option<RecordId>,
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
}
