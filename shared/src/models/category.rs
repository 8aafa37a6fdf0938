//! Category Model

use serde::{Deserialize, Serialize};

use super::item::DeliveryMode;

/// Category entity
///
/// Items reference categories by name (denormalized); renaming a category
/// fans out across items best-effort, not transactionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// Unique display name
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
    pub delivery_mode_default: DeliveryMode,
}
