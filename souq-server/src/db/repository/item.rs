//! Item Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ItemCreate, ItemRecord};
use shared::DeliveryMode;

pub const ITEM_TABLE: &str = "item";

#[derive(Clone)]
pub struct ItemRepository {
    base: BaseRepository,
}

impl ItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Available (unsold) items, storefront order.
    pub async fn find_available(&self) -> RepoResult<Vec<ItemRecord>> {
        let items: Vec<ItemRecord> = self
            .base
            .db()
            .query("SELECT * FROM item WHERE sold = false ORDER BY category, name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Sold items (admin view).
    pub async fn find_sold(&self) -> RepoResult<Vec<ItemRecord>> {
        let items: Vec<ItemRecord> = self
            .base
            .db()
            .query("SELECT * FROM item WHERE sold = true ORDER BY category, name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Unsold items in one category (denormalized category name).
    pub async fn find_available_by_category(&self, category: &str) -> RepoResult<Vec<ItemRecord>> {
        let items: Vec<ItemRecord> = self
            .base
            .db()
            .query("SELECT * FROM item WHERE sold = false AND category = $category ORDER BY name")
            .bind(("category", category.to_string()))
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ItemRecord>> {
        let item: Option<ItemRecord> = self.base.db().select((ITEM_TABLE, id)).await?;
        Ok(item)
    }

    /// Create a new item (admin action).
    pub async fn create(
        &self,
        data: ItemCreate,
        delivery_default: DeliveryMode,
    ) -> RepoResult<ItemRecord> {
        let key = Uuid::new_v4().simple().to_string();
        // id is assigned by the keyed create below
        let record = ItemRecord {
            id: None,
            name: data.name,
            price: data.price,
            seller_id: data.seller_id,
            seller_name: data.seller_name,
            category: data.category,
            hidden_payload: data.hidden_payload,
            delivery_mode: data.delivery_mode.unwrap_or(delivery_default),
            sold: false,
            buyer_id: None,
            buyer_name: None,
        };
        let created: Option<ItemRecord> = self
            .base
            .db()
            .create((ITEM_TABLE, key.as_str()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("item create returned nothing".into()))
    }

    /// Explicit admin delete; the only way an item leaves the catalog.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let deleted: Option<ItemRecord> = self.base.db().delete((ITEM_TABLE, id)).await?;
        Ok(deleted.is_some())
    }
}
