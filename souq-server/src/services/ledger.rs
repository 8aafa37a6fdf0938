//! Balance Ledger
//!
//! Reads prefer the store and refresh the mirror; when the store is down,
//! reads degrade to the mirror (flagged in logs). Credits go to the store
//! and invalidate the mirror entry. Debits never pass through here - they
//! happen only inside the purchase transaction.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::cache::MirrorCache;
use crate::db::repository::{RepoError, UserRepository};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct BalanceLedger {
    users: UserRepository,
    mirror: Arc<MirrorCache>,
}

impl BalanceLedger {
    pub fn new(users: UserRepository, mirror: Arc<MirrorCache>) -> Self {
        Self { users, mirror }
    }

    /// Authoritative balance; creates the account with 0 on first
    /// interaction. Falls back to the mirror when the store is unavailable.
    pub async fn get_balance(&self, user_id: i64) -> AppResult<Decimal> {
        match self.users.find(user_id).await {
            Ok(Some(account)) => {
                self.mirror.remember_balance(user_id, account.balance);
                Ok(account.balance)
            }
            Ok(None) => {
                let account = self.users.get_or_create(user_id, "").await?;
                self.mirror.remember_balance(user_id, account.balance);
                Ok(account.balance)
            }
            Err(RepoError::Database(msg)) => {
                tracing::warn!(user_id, error = %msg, "store read failed, serving balance from mirror (degraded)");
                self.mirror
                    .balance_of(user_id)
                    .ok_or(AppError::Store(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Admin credit. Amount must be strictly positive - negative amounts
    /// exist only inside the purchase transaction's debit.
    pub async fn credit(&self, user_id: i64, name: &str, amount: Decimal) -> AppResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "credit amount must be positive".into(),
            ));
        }
        self.users.get_or_create(user_id, name).await?;
        let new_balance = self.users.credit(user_id, amount).await?;
        self.mirror.forget_balance(user_id);
        tracing::info!(user_id, %amount, %new_balance, "balance credited");
        Ok(new_balance)
    }
}
