//! Store-level record types
//!
//! These carry SurrealDB record ids; the API boundary converts them to the
//! plain wire models in the `shared` crate (see `api::convert`).

pub mod admin;
pub mod category;
pub mod charge_key;
pub mod item;
pub mod operation;
pub mod order;
pub mod subscription;
pub mod user;

// Re-exports
pub use admin::*;
pub use category::*;
pub use charge_key::*;
pub use item::*;
pub use operation::*;
pub use order::*;
pub use subscription::*;
pub use user::*;
