//! Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fulfillment mode for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Hidden payload is sent to the buyer automatically at purchase time
    Instant,
    /// An admin must claim and complete the order before payload release
    Manual,
}

impl DeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::Instant => "instant",
            DeliveryMode::Manual => "manual",
        }
    }
}

/// Catalog item
///
/// Invariant: `sold == true` always carries a non-null `buyer_id`. The only
/// mutation after creation is the sold flip inside the purchase transaction
/// (plus explicit admin delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Non-negative price
    pub price: Decimal,
    pub seller_id: i64,
    pub seller_name: String,
    /// Denormalized category name
    pub category: String,
    /// Opaque fulfillment data (e.g. credentials); never rendered on the
    /// public storefront
    pub hidden_payload: String,
    pub delivery_mode: DeliveryMode,
    pub sold: bool,
    pub buyer_id: Option<i64>,
    pub buyer_name: Option<String>,
}

impl Item {
    /// Public view with the hidden payload stripped, for storefront listings.
    pub fn redacted(mut self) -> Self {
        self.hidden_payload.clear();
        self
    }
}
