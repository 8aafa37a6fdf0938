//! Server State
//!
//! Shared references to every service of the marketplace node. Cloning is
//! cheap (Arc and handle clones); handlers take `State<ServerState>`.

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::api::session::SessionService;
use crate::bot::{ConversationStore, VerifyCodes};
use crate::cache::MirrorCache;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    AdminRepository, CategoryRepository, ChargeKeyRepository, ItemRepository, OperationRepository,
    OrderRepository, SubscriptionRepository, UserRepository,
};
use crate::notify::{NotificationChannel, TelegramChannel};
use crate::orders::OrderContext;
use crate::services::{AdminService, BalanceLedger, ChargeKeyService};
use crate::utils::AppResult;

/// Server state - holds shared references to all services
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Best-effort read mirror of the store
    pub mirror: Arc<MirrorCache>,
    /// Outbound messaging (Telegram in production, recording mock in tests)
    pub channel: Arc<dyn NotificationChannel>,
    /// Session cookie issuing and validation
    pub sessions: SessionService,
    /// In-flight bot conversations (product wizard)
    pub conversations: Arc<ConversationStore>,
    /// Outstanding site-login verification codes
    pub verify_codes: Arc<VerifyCodes>,
    /// Dynamic admin set
    pub admins: AdminService,
    /// Wallet reads and credits
    pub ledger: BalanceLedger,
    /// Charge-key minting and redemption
    pub charge_keys: ChargeKeyService,
    // Repositories
    pub items: ItemRepository,
    pub orders: OrderRepository,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    /// Personal operations ledger (bot tracker menu)
    pub operations: OperationRepository,
    /// Subscription emails and tracked clients (bot tracker menu)
    pub subscriptions: SubscriptionRepository,
}

impl ServerState {
    /// Initialize the full state against an already-open store.
    ///
    /// Seeds the owner admin record, warms the mirror from the store, and
    /// wires the services together. The channel is injected so tests can
    /// pass the recording mock.
    pub async fn initialize(
        config: Config,
        db: Surreal<Db>,
        channel: Arc<dyn NotificationChannel>,
    ) -> AppResult<Self> {
        let mirror = Arc::new(MirrorCache::new());

        let items = ItemRepository::new(db.clone());
        let orders = OrderRepository::new(db.clone());
        let users = UserRepository::new(db.clone());
        let categories = CategoryRepository::new(db.clone());
        let keys = ChargeKeyRepository::new(db.clone());
        let operations = OperationRepository::new(db.clone());
        let subscriptions = SubscriptionRepository::new(db.clone());

        let admins = AdminService::new(AdminRepository::new(db.clone()), config.admin_id);
        if config.admin_id != 0 {
            admins.add(config.admin_id, "owner", config.admin_id).await?;
        }

        let ledger = BalanceLedger::new(users.clone(), mirror.clone());
        let charge_keys = ChargeKeyService::new(keys.clone(), users.clone(), mirror.clone());
        let sessions = SessionService::new(&config.secret_key, config.session_minutes);

        let state = Self {
            config,
            db,
            mirror,
            channel,
            sessions,
            conversations: Arc::new(ConversationStore::new()),
            verify_codes: Arc::new(VerifyCodes::new()),
            admins,
            ledger,
            charge_keys,
            items,
            orders,
            users,
            categories,
            operations,
            subscriptions,
        };
        state.warm_mirror(&keys).await;
        Ok(state)
    }

    /// Convenience initializer opening the store from config (production
    /// path).
    pub async fn initialize_from_config(
        config: Config,
        channel: Arc<dyn NotificationChannel>,
    ) -> AppResult<Self> {
        let db = DbService::open(&config.data_dir).await?;
        Self::initialize(config, db, channel).await
    }

    /// Load the mirror from the store at startup. Best effort: a failure
    /// here only means degraded-mode reads start empty.
    async fn warm_mirror(&self, keys: &ChargeKeyRepository) {
        match self.items.find_available().await {
            Ok(items) => {
                self.mirror.remember_items(&items);
                tracing::info!(count = items.len(), "mirror warmed with catalog items");
            }
            Err(e) => tracing::warn!(error = %e, "catalog mirror warm-up failed"),
        }
        match keys.find_all().await {
            Ok(all) => {
                let unused = all.into_iter().filter(|k| !k.used);
                let mut count = 0usize;
                for key in unused {
                    self.mirror.remember_key(key);
                    count += 1;
                }
                tracing::info!(count, "mirror warmed with charge keys");
            }
            Err(e) => tracing::warn!(error = %e, "charge key mirror warm-up failed"),
        }
        match self.users.find_all().await {
            Ok(accounts) => {
                let count = accounts.len();
                for account in accounts {
                    self.mirror.remember_balance(account.user_id, account.balance);
                }
                tracing::info!(count, "mirror warmed with balances");
            }
            Err(e) => tracing::warn!(error = %e, "balance mirror warm-up failed"),
        }
    }

    /// Execution context for order lifecycle actions.
    pub fn order_context(&self) -> OrderContext {
        OrderContext {
            items: self.items.clone(),
            orders: self.orders.clone(),
            users: self.users.clone(),
            admins: self.admins.clone(),
            mirror: self.mirror.clone(),
            channel: self.channel.clone(),
        }
    }

    /// Register the Telegram webhook. Best effort; only meaningful when the
    /// channel is the real transport.
    pub async fn register_webhook(&self) {
        let telegram = TelegramChannel::new(self.config.bot_token.clone());
        telegram.set_webhook(&self.config.site_url).await;
    }
}
