//! In-memory mirror of the store
//!
//! Best-effort, non-authoritative copies of balances, catalog items, and
//! charge keys for read fallback when the store is unavailable. The store
//! is always the source of truth: successful reads refresh the mirror,
//! successful writes invalidate the affected entries (never dual-write).
//!
//! Entries are DashMap-backed; there is no cross-entry locking. This is
//! acceptable only for the single-instance deployment this service targets.

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::db::models::{ChargeKeyRecord, ItemRecord};

/// Mirror cache holding the last known store state.
#[derive(Debug, Default)]
pub struct MirrorCache {
    balances: DashMap<i64, Decimal>,
    items: DashMap<String, ItemRecord>,
    keys: DashMap<String, ChargeKeyRecord>,
}

impl MirrorCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Balances ==========

    pub fn remember_balance(&self, user_id: i64, balance: Decimal) {
        self.balances.insert(user_id, balance);
    }

    pub fn balance_of(&self, user_id: i64) -> Option<Decimal> {
        self.balances.get(&user_id).map(|b| *b)
    }

    pub fn forget_balance(&self, user_id: i64) {
        self.balances.remove(&user_id);
    }

    // ========== Catalog ==========

    pub fn remember_item(&self, item: ItemRecord) {
        self.items.insert(item.key(), item);
    }

    pub fn remember_items(&self, items: &[ItemRecord]) {
        for item in items {
            self.remember_item(item.clone());
        }
    }

    pub fn item(&self, id: &str) -> Option<ItemRecord> {
        self.items.get(id).map(|i| i.clone())
    }

    /// Fallback listing of unsold items; order is unspecified.
    pub fn items_available(&self) -> Vec<ItemRecord> {
        self.items
            .iter()
            .filter(|entry| !entry.sold)
            .map(|entry| entry.clone())
            .collect()
    }

    pub fn forget_item(&self, id: &str) {
        self.items.remove(id);
    }

    // ========== Charge keys ==========

    pub fn remember_key(&self, key: ChargeKeyRecord) {
        self.keys.insert(key.code.clone(), key);
    }

    pub fn key(&self, code: &str) -> Option<ChargeKeyRecord> {
        self.keys.get(code).map(|k| k.clone())
    }

    pub fn forget_key(&self, code: &str) {
        self.keys.remove(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::DeliveryMode;

    fn item(key: &str, sold: bool) -> ItemRecord {
        ItemRecord {
            id: Some(surrealdb::RecordId::from_table_key("item", key)),
            name: "acc".into(),
            price: Decimal::new(25, 0),
            seller_id: 1,
            seller_name: "seller".into(),
            category: "games".into(),
            hidden_payload: "user:pass".into(),
            delivery_mode: DeliveryMode::Instant,
            sold,
            buyer_id: sold.then_some(2),
            buyer_name: sold.then(|| "buyer".into()),
        }
    }

    #[test]
    fn balance_round_trip_and_invalidation() {
        let mirror = MirrorCache::new();
        mirror.remember_balance(7, Decimal::new(30, 0));
        assert_eq!(mirror.balance_of(7), Some(Decimal::new(30, 0)));
        mirror.forget_balance(7);
        assert_eq!(mirror.balance_of(7), None);
    }

    #[test]
    fn available_listing_excludes_sold() {
        let mirror = MirrorCache::new();
        mirror.remember_item(item("a", false));
        mirror.remember_item(item("b", true));
        let available = mirror.items_available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].key(), "a");
    }
}
