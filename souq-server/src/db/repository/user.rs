//! User Account Repository

use rust_decimal::Decimal;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::UserAccountRecord;

pub const USER_TABLE: &str = "user_account";

/// Record id for a user account, keyed by Telegram user id.
pub fn account_id(user_id: i64) -> RecordId {
    RecordId::from_table_key(USER_TABLE, user_id)
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Fetch an account, creating it with balance 0 on first interaction.
    pub async fn get_or_create(&self, user_id: i64, name: &str) -> RepoResult<UserAccountRecord> {
        if let Some(existing) = self.find(user_id).await? {
            return Ok(existing);
        }
        let record = UserAccountRecord {
            id: None,
            user_id,
            name: name.to_string(),
            balance: Decimal::ZERO,
        };
        let created: Option<UserAccountRecord> = self
            .base
            .db()
            .create((USER_TABLE, user_id))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("account create returned nothing".into()))
    }

    pub async fn find(&self, user_id: i64) -> RepoResult<Option<UserAccountRecord>> {
        let account: Option<UserAccountRecord> =
            self.base.db().select((USER_TABLE, user_id)).await?;
        Ok(account)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<UserAccountRecord>> {
        let accounts: Vec<UserAccountRecord> = self
            .base
            .db()
            .query("SELECT * FROM user_account")
            .await?
            .take(0)?;
        Ok(accounts)
    }

    /// Increment a balance. Single store write, not wrapped in a
    /// transaction with any other step; debits happen only inside the
    /// purchase transaction in the order repository.
    pub async fn credit(&self, user_id: i64, amount: Decimal) -> RepoResult<Decimal> {
        let accounts: Vec<UserAccountRecord> = self
            .base
            .db()
            .query("UPDATE $account SET balance += $amount RETURN AFTER")
            .bind(("account", account_id(user_id)))
            .bind(("amount", amount))
            .await?
            .take(0)?;
        accounts
            .into_iter()
            .next()
            .map(|a| a.balance)
            .ok_or_else(|| RepoError::NotFound(format!("account {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    // Balances must be stored as numbers: `balance += $amount` and the
    // purchase guard `$account.balance < $item.price` both run inside
    // SurrealQL and silently misbehave on string-typed fields.

    #[tokio::test]
    async fn credits_accumulate_in_the_store() {
        let db = DbService::memory().await.expect("db");
        let repo = UserRepository::new(db);
        repo.get_or_create(7, "user").await.expect("account");

        repo.credit(7, Decimal::new(10, 0)).await.expect("first credit");
        let returned = repo.credit(7, Decimal::new(15, 0)).await.expect("second credit");
        assert_eq!(returned, Decimal::new(25, 0));

        let stored = repo.find(7).await.expect("find").expect("account");
        assert_eq!(stored.balance, Decimal::new(25, 0));
    }

    #[tokio::test]
    async fn stored_balances_compare_numerically() {
        let db = DbService::memory().await.expect("db");
        let repo = UserRepository::new(db.clone());
        repo.get_or_create(8, "user").await.expect("account");
        repo.credit(8, Decimal::new(100, 0)).await.expect("credit");

        // Lexicographically "100" < "30"; numerically it is not.
        let rows: Vec<UserAccountRecord> = db
            .query("SELECT * FROM user_account WHERE balance >= 30")
            .await
            .expect("query")
            .take(0)
            .expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, 8);
    }
}
