//! Charge Key Records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Single-use redemption code record, keyed by the code itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeKeyRecord {
    pub id: Option<RecordId>,
    pub code: String,
    /// Fixed at creation, never changes
    pub amount: Decimal,
    #[serde(default)]
    pub used: bool,
    pub used_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Statement entry written inside the redemption transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeHistoryRecord {
    pub id: Option<RecordId>,
    pub user_id: i64,
    pub amount: Decimal,
    pub code: String,
    pub created_at: DateTime<Utc>,
}
