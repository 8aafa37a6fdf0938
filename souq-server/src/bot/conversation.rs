//! Conversation state machine
//!
//! One enum variant per "next expected input", one record per in-flight
//! conversation. The product wizard threads its collected fields through the
//! variants so every step is exhaustiveness-checked.

use dashmap::DashMap;
use rust_decimal::Decimal;

/// In-flight conversation state for one user.
#[derive(Debug, Clone)]
pub enum Conversation {
    /// `/add_product` wizard: waiting for the item name
    AddProductName,
    /// Waiting for the price
    AddProductPrice { name: String },
    /// Waiting for the category name
    AddProductCategory { name: String, price: Decimal },
    /// Waiting for the hidden payload
    AddProductPayload {
        name: String,
        price: Decimal,
        category: String,
    },
    /// Waiting for the delivery mode (`instant`, `manual`, or `-` for the
    /// category default)
    AddProductDelivery {
        name: String,
        price: Decimal,
        category: String,
        payload: String,
    },
    /// Operation wizard: waiting for the title
    OperationTitle,
    /// Waiting for the details (`-` skips)
    OperationDetails { title: String },
    /// Subscription wizard: waiting for the service name
    SubscriptionType,
    /// Waiting for the subscription email
    SubscriptionEmail { subscription_type: String },
    /// Client wizard: waiting for the client name
    ClientName { subscription_id: String },
    /// Waiting for the phone number or Telegram handle
    ClientPhone {
        subscription_id: String,
        name: String,
    },
    /// Waiting for the subscription start date
    ClientStart {
        subscription_id: String,
        name: String,
        phone: String,
    },
    /// Waiting for the subscription end date
    ClientEnd {
        subscription_id: String,
        name: String,
        phone: String,
        start_date: String,
    },
}

/// Per-user conversation records. A user has at most one in-flight
/// conversation; starting a new one replaces the old.
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: DashMap<i64, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, user_id: i64, state: Conversation) {
        self.states.insert(user_id, state);
    }

    /// Remove and return the current state; the dispatcher re-inserts the
    /// successor state after handling the input.
    pub fn take(&self, user_id: i64) -> Option<Conversation> {
        self.states.remove(&user_id).map(|(_, state)| state)
    }

    pub fn cancel(&self, user_id: i64) -> bool {
        self.states.remove(&user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_the_state() {
        let store = ConversationStore::new();
        store.start(1, Conversation::AddProductName);
        assert!(matches!(store.take(1), Some(Conversation::AddProductName)));
        assert!(store.take(1).is_none());
    }

    #[test]
    fn starting_again_replaces_the_old_state() {
        let store = ConversationStore::new();
        store.start(
            1,
            Conversation::AddProductPrice {
                name: "old".into(),
            },
        );
        store.start(1, Conversation::AddProductName);
        assert!(matches!(store.take(1), Some(Conversation::AddProductName)));
    }

    #[test]
    fn cancel_reports_whether_anything_was_in_flight() {
        let store = ConversationStore::new();
        assert!(!store.cancel(1));
        store.start(1, Conversation::AddProductName);
        assert!(store.cancel(1));
    }
}
