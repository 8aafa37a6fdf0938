//! Souq Server - Telegram-driven digital-goods marketplace
//!
//! # Architecture
//!
//! - **Storefront API** (`api`): axum routes for listing, purchase, wallet
//!   top-up, and cookie sessions
//! - **Bot surface** (`bot`): webhook dispatch, admin commands, product
//!   wizard, site-login codes
//! - **Order lifecycle** (`orders`): buy → claim → complete → confirm,
//!   one action per file behind the `OrderAction` trait
//! - **Store** (`db`): embedded SurrealDB with per-collection repositories;
//!   the purchase, payout, and redemption steps run as single transactions
//! - **Mirror** (`cache`): best-effort read fallback, invalidated on write
//! - **Notifications** (`notify`): `NotificationChannel` trait with the
//!   Telegram transport and a recording mock
//!
//! # Module structure
//!
//! ```text
//! souq-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes, handlers, sessions
//! ├── bot/           # webhook updates, commands, conversations
//! ├── orders/        # order lifecycle actions
//! ├── services/      # ledger, charge keys, admins
//! ├── db/            # embedded store, models, repositories
//! ├── cache/         # store mirror
//! ├── notify/        # outbound messaging
//! └── utils/         # errors, logging, token generation
//! ```

pub mod api;
pub mod bot;
pub mod cache;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____
  / ___/____  __  ______ _
  \__ \/ __ \/ / / / __ `/
 ___/ / /_/ / /_/ / /_/ /
/____/\____/\__,_/\__, /
                    /_/
    "#
    );
}
