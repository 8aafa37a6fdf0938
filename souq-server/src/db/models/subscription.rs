//! Subscription Tracking Records
//!
//! A subscription is a shared service account (one email) under which a
//! limited number of clients are tracked with their contact details and
//! subscription window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Shared service account tracked per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: Option<RecordId>,
    pub user_id: i64,
    pub email: String,
    /// Service name ("Netflix", "Spotify", ...); free text, may be empty.
    #[serde(default)]
    pub subscription_type: String,
    /// Cap on tracked clients for this email.
    pub max_clients: u32,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }

    /// Listing label: the service name when set, the email otherwise.
    pub fn label(&self) -> &str {
        if self.subscription_type.is_empty() {
            &self.email
        } else {
            &self.subscription_type
        }
    }
}

/// One tracked client slot under a subscription email.
///
/// Dates are free text exactly as the user entered them; the tracker never
/// computes with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Option<RecordId>,
    /// Key of the owning subscription record.
    pub subscription_id: String,
    pub name: String,
    pub phone: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    /// Plain record key (without the table prefix).
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}
