//! Order Lifecycle Module
//!
//! The purchase workflow tying catalog, ledger, and the notification
//! channel together:
//!
//! ```text
//! buy ──────────────► pending ──claim──► claimed ──complete──► completed ──buyer_confirm──► confirmed
//!   └─(instant mode)──────────────────────────────────────────► completed ─┘
//! ```
//!
//! One action per file under [`actions`], all behind the [`OrderAction`]
//! trait. Guards live both in the actions (for precise error messages) and
//! inside the store transactions (for race safety).

pub mod actions;
pub mod traits;

// Re-exports
pub use actions::{BuyAction, BuyOutcome, ClaimAction, CompleteAction, ConfirmAction};
pub use traits::{OrderAction, OrderContext, OrderError};
