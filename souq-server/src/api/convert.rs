//! Record ↔ wire model conversion
//!
//! Store records carry SurrealDB `RecordId`s; the API boundary hands out
//! the plain wire models from the `shared` crate.

use crate::db::models::{
    CategoryRecord, ChargeHistoryRecord, ChargeKeyRecord, ItemRecord, OrderRecord,
    UserAccountRecord,
};
use shared::{Category, ChargeHistoryEntry, ChargeKey, Item, Order, UserAccount};

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let id = record.key();
        Item {
            id,
            name: record.name,
            price: record.price,
            seller_id: record.seller_id,
            seller_name: record.seller_name,
            category: record.category,
            hidden_payload: record.hidden_payload,
            delivery_mode: record.delivery_mode,
            sold: record.sold,
            buyer_id: record.buyer_id,
            buyer_name: record.buyer_name,
        }
    }
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        let id = record.key();
        Order {
            id,
            buyer_id: record.buyer_id,
            buyer_name: record.buyer_name,
            item_id: record.item_id,
            item_name: record.item_name,
            price: record.price,
            category: record.category,
            hidden_payload: record.hidden_payload,
            delivery_mode: record.delivery_mode,
            seller_id: record.seller_id,
            seller_name: record.seller_name,
            status: record.status,
            admin_id: record.admin_id,
            created_at: record.created_at,
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        let id = record.key();
        Category {
            id,
            name: record.name,
            image_url: record.image_url,
            display_order: record.display_order,
            delivery_mode_default: record.delivery_mode_default,
        }
    }
}

impl From<ChargeKeyRecord> for ChargeKey {
    fn from(record: ChargeKeyRecord) -> Self {
        ChargeKey {
            code: record.code,
            amount: record.amount,
            used: record.used,
            used_by: record.used_by,
            created_at: record.created_at,
        }
    }
}

impl From<ChargeHistoryRecord> for ChargeHistoryEntry {
    fn from(record: ChargeHistoryRecord) -> Self {
        ChargeHistoryEntry {
            user_id: record.user_id,
            amount: record.amount,
            code: record.code,
            created_at: record.created_at,
        }
    }
}

impl From<UserAccountRecord> for UserAccount {
    fn from(record: UserAccountRecord) -> Self {
        UserAccount {
            user_id: record.user_id,
            name: record.name,
            balance: record.balance,
        }
    }
}
