//! Shared types for the Souq marketplace
//!
//! Wire-level domain models used by the server crate and its integration
//! tests: catalog items, orders and their status machine, charge keys,
//! categories, user accounts, and the unified API response envelope.

pub mod models;
pub mod response;

// Re-exports
pub use models::{
    Category, ChargeHistoryEntry, ChargeKey, DeliveryMode, Item, Order, OrderStatus, UserAccount,
};
pub use response::AppResponse;
pub use serde::{Deserialize, Serialize};
