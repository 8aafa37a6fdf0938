//! Subscription Repository
//!
//! Subscription emails and the clients tracked under them. Clients live in
//! their own table keyed back to the subscription; deleting a subscription
//! removes its clients in the same query.

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ClientRecord, SubscriptionRecord};

pub const SUBSCRIPTION_TABLE: &str = "subscription";
pub const CLIENT_TABLE: &str = "subscription_client";

/// Default cap on clients per subscription email.
pub const DEFAULT_MAX_CLIENTS: u32 = 5;

/// Search hit: a client together with the subscription it belongs to.
#[derive(Debug, Clone)]
pub struct ClientMatch {
    pub client: ClientRecord,
    pub email: String,
    pub subscription_type: String,
}

#[derive(Clone)]
pub struct SubscriptionRepository {
    base: BaseRepository,
}

impl SubscriptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        user_id: i64,
        email: &str,
        subscription_type: &str,
        max_clients: u32,
    ) -> RepoResult<SubscriptionRecord> {
        let key = Uuid::new_v4().simple().to_string();
        let record = SubscriptionRecord {
            id: None,
            user_id,
            email: email.to_string(),
            subscription_type: subscription_type.to_string(),
            max_clients,
            created_at: Utc::now(),
        };
        let created: Option<SubscriptionRecord> = self
            .base
            .db()
            .create((SUBSCRIPTION_TABLE, key.as_str()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("subscription create returned nothing".into()))
    }

    pub async fn find_by_user(&self, user_id: i64) -> RepoResult<Vec<SubscriptionRecord>> {
        let subscriptions: Vec<SubscriptionRecord> = self
            .base
            .db()
            .query("SELECT * FROM subscription WHERE user_id = $user_id ORDER BY created_at")
            .bind(("user_id", user_id))
            .await?
            .take(0)?;
        Ok(subscriptions)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<SubscriptionRecord>> {
        let subscription: Option<SubscriptionRecord> =
            self.base.db().select((SUBSCRIPTION_TABLE, id)).await?;
        Ok(subscription)
    }

    /// Delete a subscription and every client tracked under it.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Ok(false);
        }
        self.base
            .db()
            .query("DELETE subscription_client WHERE subscription_id = $sub_id; DELETE $sub_rid")
            .bind(("sub_id", id.to_string()))
            .bind((
                "sub_rid",
                surrealdb::RecordId::from_table_key(SUBSCRIPTION_TABLE, id),
            ))
            .await?
            .check()
            .map_err(RepoError::from)?;
        Ok(true)
    }

    pub async fn add_client(
        &self,
        subscription_id: &str,
        name: &str,
        phone: &str,
        start_date: &str,
        end_date: &str,
    ) -> RepoResult<ClientRecord> {
        let key = Uuid::new_v4().simple().to_string();
        let record = ClientRecord {
            id: None,
            subscription_id: subscription_id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            created_at: Utc::now(),
        };
        let created: Option<ClientRecord> = self
            .base
            .db()
            .create((CLIENT_TABLE, key.as_str()))
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("client create returned nothing".into()))
    }

    pub async fn clients_of(&self, subscription_id: &str) -> RepoResult<Vec<ClientRecord>> {
        let clients: Vec<ClientRecord> = self
            .base
            .db()
            .query(
                "SELECT * FROM subscription_client WHERE subscription_id = $sub_id \
                 ORDER BY created_at",
            )
            .bind(("sub_id", subscription_id.to_string()))
            .await?
            .take(0)?;
        Ok(clients)
    }

    pub async fn count_clients(&self, subscription_id: &str) -> RepoResult<usize> {
        Ok(self.clients_of(subscription_id).await?.len())
    }

    pub async fn delete_client(&self, client_id: &str) -> RepoResult<bool> {
        let deleted: Option<ClientRecord> =
            self.base.db().delete((CLIENT_TABLE, client_id)).await?;
        Ok(deleted.is_some())
    }

    /// Case-insensitive substring search over client names across all of a
    /// user's subscriptions.
    pub async fn search_clients(&self, user_id: i64, term: &str) -> RepoResult<Vec<ClientMatch>> {
        let term = term.to_lowercase();
        let mut matches = Vec::new();
        for subscription in self.find_by_user(user_id).await? {
            let sub_key = subscription.key();
            for client in self.clients_of(&sub_key).await? {
                if client.name.to_lowercase().contains(&term) {
                    matches.push(ClientMatch {
                        client,
                        email: subscription.email.clone(),
                        subscription_type: subscription.subscription_type.clone(),
                    });
                }
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> SubscriptionRepository {
        let db = DbService::memory().await.expect("db");
        SubscriptionRepository::new(db)
    }

    #[tokio::test]
    async fn clients_are_counted_per_subscription() {
        let repo = repo().await;
        let netflix = repo
            .create(1, "family@example.com", "Netflix", DEFAULT_MAX_CLIENTS)
            .await
            .expect("create");
        let spotify = repo
            .create(1, "music@example.com", "Spotify", DEFAULT_MAX_CLIENTS)
            .await
            .expect("create");

        repo.add_client(&netflix.key(), "Sara", "0501234567", "2026-08-01", "2026-09-01")
            .await
            .expect("client");
        repo.add_client(&netflix.key(), "Omar", "@omar", "2026-08-10", "2026-09-10")
            .await
            .expect("client");

        assert_eq!(repo.count_clients(&netflix.key()).await.expect("count"), 2);
        assert_eq!(repo.count_clients(&spotify.key()).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn deleting_a_subscription_removes_its_clients() {
        let repo = repo().await;
        let sub = repo
            .create(1, "family@example.com", "Netflix", DEFAULT_MAX_CLIENTS)
            .await
            .expect("create");
        repo.add_client(&sub.key(), "Sara", "0501234567", "2026-08-01", "2026-09-01")
            .await
            .expect("client");

        assert!(repo.delete(&sub.key()).await.expect("delete"));
        assert!(repo.find_by_id(&sub.key()).await.expect("find").is_none());
        assert!(repo.clients_of(&sub.key()).await.expect("clients").is_empty());
        // A second delete reports nothing to do.
        assert!(!repo.delete(&sub.key()).await.expect("redelete"));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_user_scoped() {
        let repo = repo().await;
        let mine = repo
            .create(1, "family@example.com", "Netflix", DEFAULT_MAX_CLIENTS)
            .await
            .expect("create");
        let theirs = repo
            .create(2, "other@example.com", "Netflix", DEFAULT_MAX_CLIENTS)
            .await
            .expect("create");
        repo.add_client(&mine.key(), "Sara Khalid", "0501234567", "2026-08-01", "2026-09-01")
            .await
            .expect("client");
        repo.add_client(&theirs.key(), "Sara Other", "0507654321", "2026-08-01", "2026-09-01")
            .await
            .expect("client");

        let hits = repo.search_clients(1, "sara").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].client.name, "Sara Khalid");
        assert_eq!(hits[0].email, "family@example.com");

        assert!(repo.search_clients(1, "nadia").await.expect("search").is_empty());
    }
}
