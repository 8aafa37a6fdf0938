//! User Account Record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Per-user wallet record, keyed by Telegram user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccountRecord {
    pub id: Option<RecordId>,
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
    pub balance: Decimal,
}
