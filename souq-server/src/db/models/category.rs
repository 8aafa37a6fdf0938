//! Category Record

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use shared::DeliveryMode;

/// Category record. `name` is unique (index) and denormalized into items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
    pub delivery_mode_default: DeliveryMode,
}

impl CategoryRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

/// Create category payload (admin action)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub display_order: Option<i32>,
    pub delivery_mode_default: Option<DeliveryMode>,
}

/// Update category payload (admin action)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub delivery_mode_default: Option<DeliveryMode>,
}
