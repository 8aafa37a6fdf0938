//! Category Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CategoryCreate, CategoryRecord, CategoryUpdate};
use shared::DeliveryMode;

pub const CATEGORY_TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<CategoryRecord>> {
        let categories: Vec<CategoryRecord> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY display_order, name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<CategoryRecord>> {
        let category: Option<CategoryRecord> =
            self.base.db().select((CATEGORY_TABLE, id)).await?;
        Ok(category)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<CategoryRecord>> {
        let categories: Vec<CategoryRecord> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE name = $name")
            .bind(("name", name.to_string()))
            .await?
            .take(0)?;
        Ok(categories.into_iter().next())
    }

    pub async fn create(&self, data: CategoryCreate) -> RepoResult<CategoryRecord> {
        let key = Uuid::new_v4().simple().to_string();
        let record = CategoryRecord {
            id: None,
            name: data.name,
            image_url: data.image_url,
            display_order: data.display_order.unwrap_or(0),
            delivery_mode_default: data.delivery_mode_default.unwrap_or(DeliveryMode::Manual),
        };
        let created: Option<CategoryRecord> = self
            .base
            .db()
            .create((CATEGORY_TABLE, key.as_str()))
            .content(record)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("category_name") {
                    RepoError::Duplicate("category name already exists".into())
                } else {
                    RepoError::Database(msg)
                }
            })?;
        created.ok_or_else(|| RepoError::Database("category create returned nothing".into()))
    }

    /// Update a category. Renames fan out to items best-effort - the item
    /// update is a separate statement and a failure there leaves stale
    /// names, which the caller only logs.
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<CategoryRecord> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("category {id}")))?;

        let old_name = existing.name.clone();
        let updated = CategoryRecord {
            id: existing.id.clone(),
            name: data.name.unwrap_or(existing.name),
            image_url: data.image_url.unwrap_or(existing.image_url),
            display_order: data.display_order.unwrap_or(existing.display_order),
            delivery_mode_default: data
                .delivery_mode_default
                .unwrap_or(existing.delivery_mode_default),
        };
        let new_name = updated.name.clone();

        let saved: Option<CategoryRecord> = self
            .base
            .db()
            .update((CATEGORY_TABLE, id))
            .content(CategoryRecord {
                id: None,
                ..updated
            })
            .await?;
        let saved =
            saved.ok_or_else(|| RepoError::Database("category update returned nothing".into()))?;

        if old_name != new_name {
            self.rename_fanout(&old_name, &new_name).await;
        }

        Ok(saved)
    }

    /// Best-effort fan-out of a category rename across denormalized item
    /// records. Not transactional with the rename itself.
    async fn rename_fanout(&self, old_name: &str, new_name: &str) {
        let result = self
            .base
            .db()
            .query("UPDATE item SET category = $new_name WHERE category = $old_name")
            .bind(("new_name", new_name.to_string()))
            .bind(("old_name", old_name.to_string()))
            .await;
        match result.map(|r| r.check()) {
            Ok(Ok(_)) => {
                tracing::info!(old_name, new_name, "category rename fanned out to items");
            }
            Ok(Err(e)) | Err(e) => {
                tracing::warn!(
                    old_name,
                    new_name,
                    error = %e,
                    "category rename fan-out failed, item categories are stale"
                );
            }
        }
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let deleted: Option<CategoryRecord> =
            self.base.db().delete((CATEGORY_TABLE, id)).await?;
        Ok(deleted.is_some())
    }
}
