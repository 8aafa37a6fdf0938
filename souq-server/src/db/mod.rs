//! Database Module
//!
//! Embedded SurrealDB storage. RocksDB engine in production, in-memory
//! engine for tests.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "souq";
const DATABASE: &str = "souq";

/// Database service - opens the embedded store and applies schema definitions
pub struct DbService;

impl DbService {
    /// Open the persistent store under `data_dir/database`.
    pub async fn open(data_dir: &str) -> Result<Surreal<Db>, AppError> {
        let path = format!("{data_dir}/database");
        let db = Surreal::new::<RocksDb>(path.as_str())
            .await
            .map_err(|e| AppError::Store(format!("failed to open database: {e}")))?;
        Self::prepare(&db).await?;
        tracing::info!(path, "database opened");
        Ok(db)
    }

    /// Open a throwaway in-memory store (tests).
    pub async fn memory() -> Result<Surreal<Db>, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::Store(format!("failed to open in-memory database: {e}")))?;
        Self::prepare(&db).await?;
        Ok(db)
    }

    /// Select namespace/database and apply index definitions.
    async fn prepare(db: &Surreal<Db>) -> Result<(), AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Store(format!("failed to select namespace: {e}")))?;

        // Category names are unique; items reference categories by name.
        db.query("DEFINE INDEX IF NOT EXISTS category_name ON TABLE category FIELDS name UNIQUE")
            .await
            .map_err(|e| AppError::Store(format!("failed to define indexes: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::UserRepository;

    #[tokio::test]
    async fn persistent_store_opens_and_accepts_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = DbService::open(dir.path().to_str().expect("utf8 path"))
            .await
            .expect("open store");

        let users = UserRepository::new(db);
        users.get_or_create(7, "tester").await.expect("create");
        let found = users.find(7).await.expect("find").expect("account");
        assert_eq!(found.name, "tester");
    }
}
