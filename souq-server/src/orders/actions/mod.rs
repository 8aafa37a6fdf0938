//! Order lifecycle actions, one per file

pub mod buy;
pub mod claim;
pub mod complete;
pub mod confirm;

pub use buy::{BuyAction, BuyOutcome};
pub use claim::ClaimAction;
pub use complete::CompleteAction;
pub use confirm::ConfirmAction;

#[cfg(test)]
pub(crate) mod testkit {
    //! Shared fixtures for action tests: in-memory store, recording
    //! channel, seeded accounts and items.

    use rust_decimal::Decimal;
    use std::sync::Arc;

    use crate::cache::MirrorCache;
    use crate::db::DbService;
    use crate::db::models::{ItemCreate, ItemRecord};
    use crate::db::repository::AdminRepository;
    use crate::notify::{NotificationChannel, RecordingChannel};
    use crate::orders::OrderContext;
    use crate::services::AdminService;
    use shared::DeliveryMode;

    pub const OWNER: i64 = 900;
    pub const SECOND_ADMIN: i64 = 901;
    pub const SELLER: i64 = 10;
    pub const BUYER: i64 = 20;

    pub struct TestRig {
        pub ctx: OrderContext,
        pub channel: Arc<RecordingChannel>,
    }

    pub async fn rig() -> TestRig {
        let db = DbService::memory().await.expect("in-memory db");
        let admins = AdminService::new(AdminRepository::new(db.clone()), OWNER);
        admins
            .add(SECOND_ADMIN, "second", OWNER)
            .await
            .expect("seed admin");
        let channel = Arc::new(RecordingChannel::new());
        let ctx = OrderContext::new(
            db,
            admins,
            Arc::new(MirrorCache::new()),
            channel.clone() as Arc<dyn NotificationChannel>,
        );
        TestRig { ctx, channel }
    }

    impl TestRig {
        pub async fn seed_item(&self, price: i64, mode: DeliveryMode) -> ItemRecord {
            self.ctx
                .items
                .create(
                    ItemCreate {
                        name: "netflix account".into(),
                        price: Decimal::new(price, 0),
                        seller_id: SELLER,
                        seller_name: "seller".into(),
                        category: "streaming".into(),
                        hidden_payload: "user@example.com:hunter2".into(),
                        delivery_mode: Some(mode),
                    },
                    mode,
                )
                .await
                .expect("seed item")
        }

        pub async fn seed_balance(&self, user_id: i64, amount: i64) {
            self.ctx
                .users
                .get_or_create(user_id, "user")
                .await
                .expect("account");
            if amount > 0 {
                self.ctx
                    .users
                    .credit(user_id, Decimal::new(amount, 0))
                    .await
                    .expect("credit");
            }
        }

        pub async fn balance(&self, user_id: i64) -> Decimal {
            self.ctx
                .users
                .find(user_id)
                .await
                .expect("find account")
                .map(|a| a.balance)
                .unwrap_or_default()
        }
    }
}
