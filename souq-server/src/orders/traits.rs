//! Order action trait, execution context, and error type

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::cache::MirrorCache;
use crate::db::repository::{ItemRepository, OrderRepository, RepoError, UserRepository};
use crate::notify::NotificationChannel;
use crate::services::AdminService;
use crate::utils::AppError;
use shared::OrderStatus;

/// Order lifecycle errors. Guard violations carry enough context for a
/// user-facing message; `Store` covers everything the caller can only retry.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("item {0} not found")]
    ItemNotFound(String),

    #[error("item '{0}' is already sold")]
    AlreadySold(String),

    #[error("insufficient balance: price {price}, balance {balance}")]
    InsufficientBalance { price: Decimal, balance: Decimal },

    #[error("buyer {0} cannot receive messages")]
    BuyerUnreachable(i64),

    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("order {order_id} is already claimed by admin {holder}")]
    AlreadyClaimed { order_id: String, holder: i64 },

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("only the claiming admin can complete this order")]
    NotClaimant,

    #[error("only the recorded buyer can confirm this order")]
    NotBuyer,

    #[error("caller is not an admin")]
    NotAdmin,

    #[error("store error: {0}")]
    Store(String),
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        OrderError::Store(err.to_string())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ItemNotFound(id) => AppError::NotFound(format!("item {id}")),
            OrderError::OrderNotFound(id) => AppError::NotFound(format!("order {id}")),
            OrderError::AlreadySold(name) => AppError::AlreadySold(name),
            OrderError::InsufficientBalance { .. } => AppError::InsufficientBalance,
            OrderError::BuyerUnreachable(user_id) => AppError::Unreachable(user_id),
            OrderError::AlreadyClaimed { order_id, holder } => AppError::Conflict(format!(
                "order {order_id} is already claimed by admin {holder}"
            )),
            OrderError::InvalidTransition { from, to } => {
                AppError::Conflict(format!("cannot move order from {from} to {to}"))
            }
            OrderError::NotClaimant => {
                AppError::Forbidden("only the claiming admin can complete this order".into())
            }
            OrderError::NotBuyer => {
                AppError::Forbidden("only the recorded buyer can confirm this order".into())
            }
            OrderError::NotAdmin => AppError::Forbidden("admin action".into()),
            OrderError::Store(msg) => AppError::Store(msg),
        }
    }
}

/// Everything an order action needs: repositories, the mirror to
/// invalidate, the admin set, and the outbound channel.
#[derive(Clone)]
pub struct OrderContext {
    pub items: ItemRepository,
    pub orders: OrderRepository,
    pub users: UserRepository,
    pub admins: AdminService,
    pub mirror: Arc<MirrorCache>,
    pub channel: Arc<dyn NotificationChannel>,
}

impl OrderContext {
    pub fn new(
        db: Surreal<Db>,
        admins: AdminService,
        mirror: Arc<MirrorCache>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            items: ItemRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
            admins,
            mirror,
            channel,
        }
    }
}

/// A single lifecycle transition. Implementations validate guards, run the
/// store write, invalidate the mirror, and fire non-fatal notifications.
#[async_trait]
pub trait OrderAction {
    type Output;

    async fn execute(&self, ctx: &OrderContext) -> Result<Self::Output, OrderError>;
}
