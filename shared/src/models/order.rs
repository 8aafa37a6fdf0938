//! Order Model
//!
//! Order status is a closed enum with a single transition function; every
//! lifecycle action consults [`OrderStatus::can_transition`] so illegal
//! moves are impossible to express.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::item::DeliveryMode;

/// Order lifecycle status.
///
/// Manual path:  pending → claimed → completed → confirmed
/// Instant path: completed → confirmed (creation collapses straight
/// to completed inside the purchase transaction).
///
/// `confirmed` is terminal; `completed` is accepted as terminal in practice
/// when the buyer never confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Claimed,
    Completed,
    Confirmed,
}

impl OrderStatus {
    /// Whether `self → next` is a legal transition.
    ///
    /// Transitions are monotonic and single-direction; there is no rollback.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Claimed)
                | (OrderStatus::Claimed, OrderStatus::Completed)
                | (OrderStatus::Completed, OrderStatus::Confirmed)
        )
    }

    /// Terminal states never transition again.
    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Confirmed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Claimed => "claimed",
            OrderStatus::Completed => "completed",
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
///
/// Carries a denormalized snapshot of the item at purchase time so later
/// catalog edits never change what the buyer paid for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub buyer_id: i64,
    pub buyer_name: String,
    /// Item snapshot
    pub item_id: String,
    pub item_name: String,
    pub price: Decimal,
    pub category: String,
    /// Opaque fulfillment data, revealed only post-purchase
    pub hidden_payload: String,
    pub delivery_mode: DeliveryMode,
    pub seller_id: i64,
    pub seller_name: String,
    pub status: OrderStatus,
    /// Admin that claimed the order (manual path only)
    pub admin_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_path_transitions_are_legal() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Claimed));
        assert!(OrderStatus::Claimed.can_transition(OrderStatus::Completed));
        assert!(OrderStatus::Completed.can_transition(OrderStatus::Confirmed));
    }

    #[test]
    fn no_rollback_and_no_skipping() {
        assert!(!OrderStatus::Claimed.can_transition(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Confirmed.can_transition(OrderStatus::Completed));
    }

    #[test]
    fn confirmed_is_terminal() {
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Completed.is_terminal());
        for next in [
            OrderStatus::Pending,
            OrderStatus::Claimed,
            OrderStatus::Completed,
            OrderStatus::Confirmed,
        ] {
            assert!(!OrderStatus::Confirmed.can_transition(next));
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(OrderStatus::Claimed.to_string(), "claimed");
    }
}
