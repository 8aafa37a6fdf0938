//! Charge Key Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Single-use, pre-minted redemption code.
///
/// `amount` is fixed at creation and never changes; the only mutation is
/// the `used` flip (with `used_by`) inside the redemption transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeKey {
    /// Unguessable token, e.g. `SQ-9F3KX27PQ4BM`
    pub code: String,
    pub amount: Decimal,
    pub used: bool,
    pub used_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Statement entry recorded at redemption time, displayed on the wallet page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeHistoryEntry {
    pub user_id: i64,
    pub amount: Decimal,
    pub code: String,
    pub created_at: DateTime<Utc>,
}
