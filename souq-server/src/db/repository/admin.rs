//! Admin Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::AdminRecord;

pub const ADMIN_TABLE: &str = "admin";

#[derive(Clone)]
pub struct AdminRepository {
    base: BaseRepository,
}

impl AdminRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find(&self, user_id: i64) -> RepoResult<Option<AdminRecord>> {
        let admin: Option<AdminRecord> = self.base.db().select((ADMIN_TABLE, user_id)).await?;
        Ok(admin)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<AdminRecord>> {
        let admins: Vec<AdminRecord> = self
            .base
            .db()
            .query("SELECT * FROM admin ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(admins)
    }

    /// Idempotent add: re-adding an existing admin returns the existing
    /// record.
    pub async fn add(&self, user_id: i64, name: &str, added_by: i64) -> RepoResult<AdminRecord> {
        if let Some(existing) = self.find(user_id).await? {
            return Ok(existing);
        }
        let record = AdminRecord {
            id: None,
            user_id,
            name: name.to_string(),
            added_by,
            created_at: Utc::now(),
        };
        let created: Option<AdminRecord> = self
            .base
            .db()
            .create((ADMIN_TABLE, user_id))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("admin create returned nothing".into()))
    }

    pub async fn remove(&self, user_id: i64) -> RepoResult<bool> {
        let deleted: Option<AdminRecord> = self.base.db().delete((ADMIN_TABLE, user_id)).await?;
        Ok(deleted.is_some())
    }
}
