//! Admin Service
//!
//! Dynamic admin set stored in the `admin` table, always containing the
//! owner id from config.

use crate::db::models::AdminRecord;
use crate::db::repository::AdminRepository;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct AdminService {
    repo: AdminRepository,
    owner_id: i64,
}

impl AdminService {
    pub fn new(repo: AdminRepository, owner_id: i64) -> Self {
        Self { repo, owner_id }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    /// Membership check. A store failure denies (logged) rather than
    /// granting admin rights from stale data.
    pub async fn is_admin(&self, user_id: i64) -> bool {
        if user_id == self.owner_id {
            return true;
        }
        match self.repo.find(user_id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "admin lookup failed, denying");
                false
            }
        }
    }

    /// All admin ids including the owner, for broadcasts.
    pub async fn admin_ids(&self) -> Vec<i64> {
        let mut ids = vec![self.owner_id];
        if let Ok(admins) = self.repo.find_all().await {
            for admin in admins {
                if admin.user_id != self.owner_id {
                    ids.push(admin.user_id);
                }
            }
        }
        ids
    }

    pub async fn add(&self, user_id: i64, name: &str, added_by: i64) -> AppResult<AdminRecord> {
        Ok(self.repo.add(user_id, name, added_by).await?)
    }

    /// Remove an admin. The owner cannot be removed.
    pub async fn remove(&self, user_id: i64) -> AppResult<bool> {
        if user_id == self.owner_id {
            return Err(AppError::Forbidden("cannot remove the owner".into()));
        }
        Ok(self.repo.remove(user_id).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<AdminRecord>> {
        Ok(self.repo.find_all().await?)
    }
}
