//! Item Record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use shared::DeliveryMode;

/// Catalog item record
///
/// Mutated once after creation - the sold flip inside the purchase
/// transaction. Invariant: `sold == true` implies `buyer_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: Option<RecordId>,
    pub name: String,
    pub price: Decimal,
    pub seller_id: i64,
    pub seller_name: String,
    /// Denormalized category name
    pub category: String,
    pub hidden_payload: String,
    pub delivery_mode: DeliveryMode,
    #[serde(default)]
    pub sold: bool,
    pub buyer_id: Option<i64>,
    pub buyer_name: Option<String>,
}

impl ItemRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

/// Create item payload (admin action)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Must be non-negative; checked in the handler since validator has no
    /// Decimal range support
    pub price: Decimal,
    pub seller_id: i64,
    #[validate(length(min = 1, max = 64))]
    pub seller_name: String,
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    #[validate(length(min = 1))]
    pub hidden_payload: String,
    /// Defaults to the category's delivery_mode_default when omitted
    pub delivery_mode: Option<DeliveryMode>,
}
