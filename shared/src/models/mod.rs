//! Data models
//!
//! Shared between souq-server and its API consumers. The server keeps its
//! own store-level record types (with SurrealDB record ids) and converts to
//! these wire types at the API boundary.

pub mod category;
pub mod charge_key;
pub mod item;
pub mod order;
pub mod user;

// Re-exports
pub use category::*;
pub use charge_key::*;
pub use item::*;
pub use order::*;
pub use user::*;
