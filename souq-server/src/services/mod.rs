//! Service layer
//!
//! - [`BalanceLedger`] - wallet reads/credits with mirror fallback
//! - [`ChargeKeyService`] - key minting and atomic redemption
//! - [`AdminService`] - dynamic admin set seeded from the owner id

pub mod admins;
pub mod charge_keys;
pub mod ledger;

pub use admins::AdminService;
pub use charge_keys::ChargeKeyService;
pub use ledger::BalanceLedger;
