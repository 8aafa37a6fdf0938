//! Charge Key Service
//!
//! Minting and redemption of single-use balance codes. Redemption rides the
//! repository's single transaction (check-used, credit, flip used, write
//! history) so a replayed code can never double-credit.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::cache::MirrorCache;
use crate::db::models::{ChargeHistoryRecord, ChargeKeyRecord};
use crate::db::repository::charge_key::RedeemTxError;
use crate::db::repository::{ChargeKeyRepository, UserRepository};
use crate::utils::{AppError, AppResult};

const MAX_BATCH: u32 = 50;

#[derive(Clone)]
pub struct ChargeKeyService {
    keys: ChargeKeyRepository,
    users: UserRepository,
    mirror: Arc<MirrorCache>,
}

impl ChargeKeyService {
    pub fn new(
        keys: ChargeKeyRepository,
        users: UserRepository,
        mirror: Arc<MirrorCache>,
    ) -> Self {
        Self {
            keys,
            users,
            mirror,
        }
    }

    /// Mint a batch of keys (admin action). Returns the codes.
    pub async fn generate(&self, amount: Decimal, count: u32) -> AppResult<Vec<String>> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("key amount must be positive".into()));
        }
        if count == 0 || count > MAX_BATCH {
            return Err(AppError::Validation(format!(
                "key count must be between 1 and {MAX_BATCH}"
            )));
        }
        let minted = self.keys.create_batch(amount, count).await?;
        for key in &minted {
            self.mirror.remember_key(key.clone());
        }
        tracing::info!(count, %amount, "charge keys minted");
        Ok(minted.into_iter().map(|k| k.code).collect())
    }

    /// Redeem a code for the given user. Returns the credited amount.
    pub async fn redeem(&self, code: &str, user_id: i64, user_name: &str) -> AppResult<Decimal> {
        // The transaction updates the account, so it must exist first.
        self.users.get_or_create(user_id, user_name).await?;

        match self.keys.redeem(code, user_id).await {
            Ok(amount) => {
                self.mirror.forget_key(code);
                self.mirror.forget_balance(user_id);
                tracing::info!(user_id, code, %amount, "charge key redeemed");
                Ok(amount)
            }
            Err(RedeemTxError::NotFound) => {
                // Unknown to the store; the mirror only ever holds keys the
                // store minted, so check it just to sharpen the log.
                if self.mirror.key(code).is_some() {
                    tracing::warn!(code, "key present in mirror but missing from store");
                }
                Err(AppError::NotFound(format!("charge key {code}")))
            }
            Err(RedeemTxError::AlreadyUsed) => Err(AppError::AlreadyUsed(code.to_string())),
            Err(RedeemTxError::Repo(e)) => Err(e.into()),
        }
    }

    pub async fn find(&self, code: &str) -> AppResult<Option<ChargeKeyRecord>> {
        Ok(self.keys.find_by_code(code).await?)
    }

    /// All keys, newest first (admin view).
    pub async fn list(&self) -> AppResult<Vec<ChargeKeyRecord>> {
        Ok(self.keys.find_all().await?)
    }

    /// Statement entries for the wallet page.
    pub async fn history(&self, user_id: i64) -> AppResult<Vec<ChargeHistoryRecord>> {
        Ok(self.keys.history_for(user_id).await?)
    }
}
