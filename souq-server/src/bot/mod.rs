//! Bot Module
//!
//! Telegram surface of the marketplace: webhook update types, the command
//! and callback dispatcher, the wizard conversation store, the operations
//! and subscription tracker menus, and the site-login verification codes.

pub mod commands;
pub mod conversation;
pub mod tracker;
pub mod update;
pub mod verify;

// Re-exports
pub use commands::dispatch;
pub use conversation::{Conversation, ConversationStore};
pub use update::Update;
pub use verify::VerifyCodes;
