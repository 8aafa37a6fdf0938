//! User Account Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-user wallet balance, keyed by Telegram user id.
///
/// Created with balance 0 on first interaction; never deleted. Mutated by
/// admin credit, charge-key redemption, and the purchase debit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
    pub balance: Decimal,
}
