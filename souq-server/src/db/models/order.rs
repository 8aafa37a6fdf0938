//! Order Record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::{DeliveryMode, OrderStatus};

/// Order record, created atomically with the item sold flip.
///
/// Carries a denormalized item snapshot so catalog edits after purchase
/// never change what the buyer paid for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Option<RecordId>,
    pub buyer_id: i64,
    pub buyer_name: String,
    // -- item snapshot --
    pub item_id: String,
    pub item_name: String,
    pub price: Decimal,
    pub category: String,
    pub hidden_payload: String,
    pub delivery_mode: DeliveryMode,
    pub seller_id: i64,
    pub seller_name: String,
    // -- lifecycle --
    pub status: OrderStatus,
    /// Set on claim (manual path only)
    pub admin_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}
