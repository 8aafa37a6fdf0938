//! Operation Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::OperationRecord;

pub const OPERATION_TABLE: &str = "operation";

#[derive(Clone)]
pub struct OperationRepository {
    base: BaseRepository,
}

impl OperationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        details: &str,
    ) -> RepoResult<OperationRecord> {
        let key = Uuid::new_v4().simple().to_string();
        let record = OperationRecord {
            id: None,
            user_id,
            title: title.to_string(),
            details: details.to_string(),
            created_at: Utc::now(),
        };
        let created: Option<OperationRecord> = self
            .base
            .db()
            .create((OPERATION_TABLE, key.as_str()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("operation create returned nothing".into()))
    }

    pub async fn find_by_user(&self, user_id: i64) -> RepoResult<Vec<OperationRecord>> {
        let operations: Vec<OperationRecord> = self
            .base
            .db()
            .query("SELECT * FROM operation WHERE user_id = $user_id ORDER BY created_at DESC")
            .bind(("user_id", user_id))
            .await?
            .take(0)?;
        Ok(operations)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<OperationRecord>> {
        let operation: Option<OperationRecord> =
            self.base.db().select((OPERATION_TABLE, id)).await?;
        Ok(operation)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let deleted: Option<OperationRecord> =
            self.base.db().delete((OPERATION_TABLE, id)).await?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn operations_are_scoped_to_their_user() {
        let db = DbService::memory().await.expect("db");
        let repo = OperationRepository::new(db);

        repo.create(1, "renew domain", "expires friday")
            .await
            .expect("create");
        repo.create(2, "other user's task", "").await.expect("create");

        let mine = repo.find_by_user(1).await.expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "renew domain");
    }

    #[tokio::test]
    async fn delete_removes_the_operation() {
        let db = DbService::memory().await.expect("db");
        let repo = OperationRepository::new(db);

        let op = repo.create(1, "one-off", "").await.expect("create");
        assert!(repo.delete(&op.key()).await.expect("delete"));
        assert!(repo.find_by_id(&op.key()).await.expect("find").is_none());
        assert!(repo.find_by_user(1).await.expect("list").is_empty());
    }
}
