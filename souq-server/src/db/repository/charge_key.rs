//! Charge Key Repository
//!
//! Redemption is one transaction: check-used, credit the account, flip the
//! used flag, write the statement entry. A crash can no longer land between
//! "credit applied" and "key marked used".

use chrono::Utc;
use rust_decimal::Decimal;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use super::user::account_id;
use super::{BaseRepository, RepoError, RepoResult, thrown};
use crate::db::models::{ChargeHistoryRecord, ChargeKeyRecord};
use crate::utils::token::generate_key_code;

pub const KEY_TABLE: &str = "charge_key";
pub const HISTORY_TABLE: &str = "charge_history";

/// Redemption transaction failure, mapped from `THROW` markers.
#[derive(Debug, Error)]
pub enum RedeemTxError {
    #[error("charge key not found")]
    NotFound,
    #[error("charge key already used")]
    AlreadyUsed,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct ChargeKeyRepository {
    base: BaseRepository,
}

impl ChargeKeyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Mint a batch of pre-priced keys (admin action). Returns the created
    /// records in mint order.
    pub async fn create_batch(
        &self,
        amount: Decimal,
        count: u32,
    ) -> RepoResult<Vec<ChargeKeyRecord>> {
        let mut minted = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let code = generate_key_code();
            let record = ChargeKeyRecord {
                id: None,
                code: code.clone(),
                amount,
                used: false,
                used_by: None,
                created_at: Utc::now(),
            };
            let created: Option<ChargeKeyRecord> = self
                .base
                .db()
                .create((KEY_TABLE, code.as_str()))
                .content(record)
                .await?;
            minted.push(created.ok_or_else(|| {
                RepoError::Database("charge key create returned nothing".into())
            })?);
        }
        Ok(minted)
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChargeKeyRecord>> {
        let key: Option<ChargeKeyRecord> = self.base.db().select((KEY_TABLE, code)).await?;
        Ok(key)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<ChargeKeyRecord>> {
        let keys: Vec<ChargeKeyRecord> = self
            .base
            .db()
            .query("SELECT * FROM charge_key ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(keys)
    }

    /// Atomic redemption. The caller must ensure the user account exists
    /// (`UserRepository::get_or_create`) before invoking this.
    pub async fn redeem(&self, code: &str, user_id: i64) -> Result<Decimal, RedeemTxError> {
        let key_rid = RecordId::from_table_key(KEY_TABLE, code);

        let result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $key = (SELECT * FROM $key_rid)[0];
                IF $key IS NONE { THROW "tx_key_not_found" };
                IF $key.used { THROW "tx_key_used" };
                UPDATE $key_rid SET used = true, used_by = $user_id;
                UPDATE $account_rid SET balance += $key.amount;
                CREATE charge_history CONTENT {
                    user_id: $user_id,
                    amount: $key.amount,
                    code: $code,
                    created_at: $created_at
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("key_rid", key_rid))
            .bind(("account_rid", account_id(user_id)))
            .bind(("user_id", user_id))
            .bind(("code", code.to_string()))
            .bind(("created_at", Utc::now()))
            .await
            .map_err(RepoError::from)?
            .check();

        if let Err(err) = result {
            return Err(if thrown(&err, "tx_key_not_found") {
                RedeemTxError::NotFound
            } else if thrown(&err, "tx_key_used") {
                RedeemTxError::AlreadyUsed
            } else {
                RedeemTxError::Repo(RepoError::from(err))
            });
        }

        let key = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| RepoError::Database("redeemed key is missing".to_string()))?;
        Ok(key.amount)
    }

    /// Statement entries for the wallet page, newest first.
    pub async fn history_for(&self, user_id: i64) -> RepoResult<Vec<ChargeHistoryRecord>> {
        let entries: Vec<ChargeHistoryRecord> = self
            .base
            .db()
            .query(
                "SELECT * FROM charge_history WHERE user_id = $user_id ORDER BY created_at DESC",
            )
            .bind(("user_id", user_id))
            .await?
            .take(0)?;
        Ok(entries)
    }
}
