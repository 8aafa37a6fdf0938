//! Repository Module
//!
//! Per-collection CRUD over the embedded SurrealDB store. Multi-step writes
//! that must be atomic (purchase, redemption, completion payout) run as a
//! single `BEGIN TRANSACTION ... COMMIT` query with `THROW` guards; the
//! thrown markers are mapped back to typed errors here.

pub mod admin;
pub mod category;
pub mod charge_key;
pub mod item;
pub mod operation;
pub mod order;
pub mod subscription;
pub mod user;

// Re-exports
pub use admin::AdminRepository;
pub use category::CategoryRepository;
pub use charge_key::ChargeKeyRepository;
pub use item::ItemRepository;
pub use operation::OperationRepository;
pub use order::OrderRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Store(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Whether a transaction error carries the given `THROW` marker.
///
/// SurrealDB surfaces thrown values as part of the error message; the
/// markers are short snake_case tokens unique enough not to collide with
/// engine wording.
pub(crate) fn thrown(err: &surrealdb::Error, marker: &str) -> bool {
    err.to_string().contains(marker)
}
