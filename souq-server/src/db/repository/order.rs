//! Order Repository
//!
//! Owns the two store transactions of the order lifecycle: the purchase
//! (debit + sold flip + order create, committed together) and the payout on
//! completion. Guards are re-checked inside the transaction with `THROW`
//! markers so concurrent callers cannot slip past the Rust-side checks.

use chrono::Utc;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;
use uuid::Uuid;

use super::user::account_id;
use super::{BaseRepository, RepoError, RepoResult, thrown};
use crate::db::models::OrderRecord;
use shared::OrderStatus;

pub const ORDER_TABLE: &str = "shop_order";

/// Purchase transaction failure, mapped from `THROW` markers.
#[derive(Debug, Error)]
pub enum PurchaseTxError {
    #[error("item not found")]
    ItemNotFound,
    #[error("item already sold")]
    AlreadySold,
    #[error("buyer account missing")]
    AccountMissing,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Completion transaction failure, mapped from `THROW` markers.
#[derive(Debug, Error)]
pub enum CompleteTxError {
    #[error("order not found")]
    OrderNotFound,
    #[error("order is not in claimed state")]
    WrongState,
    #[error("caller is not the claiming admin")]
    NotClaimant,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// The atomic purchase: debit the buyer, mark the item sold, create the
    /// order - committed together or not at all. An instant purchase
    /// (`initial_status == Completed`) also credits the seller inside the
    /// same commit; the caller must ensure the seller account exists.
    ///
    /// Guards run again inside the transaction; a buyer racing another buyer
    /// to the same item loses with [`PurchaseTxError::AlreadySold`] and no
    /// partial effects.
    pub async fn create_via_purchase(
        &self,
        item_id: &str,
        buyer_id: i64,
        buyer_name: &str,
        initial_status: OrderStatus,
        seller_id: i64,
    ) -> Result<OrderRecord, PurchaseTxError> {
        let order_key = Uuid::new_v4().simple().to_string();
        let order_rid = RecordId::from_table_key(ORDER_TABLE, order_key.clone());
        let item_rid = RecordId::from_table_key(super::item::ITEM_TABLE, item_id);

        let result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $item = (SELECT * FROM $item_rid)[0];
                IF $item IS NONE { THROW "tx_item_not_found" };
                IF $item.sold { THROW "tx_already_sold" };
                LET $account = (SELECT * FROM $account_rid)[0];
                IF $account IS NONE { THROW "tx_account_missing" };
                IF $account.balance < $item.price { THROW "tx_insufficient_balance" };
                UPDATE $account_rid SET balance -= $item.price;
                IF $status = 'completed' { UPDATE $seller_rid SET balance += $item.price; };
                UPDATE $item_rid SET sold = true, buyer_id = $buyer_id, buyer_name = $buyer_name;
                CREATE $order_rid CONTENT {
                    buyer_id: $buyer_id,
                    buyer_name: $buyer_name,
                    item_id: $item_key,
                    item_name: $item.name,
                    price: $item.price,
                    category: $item.category,
                    hidden_payload: $item.hidden_payload,
                    delivery_mode: $item.delivery_mode,
                    seller_id: $item.seller_id,
                    seller_name: $item.seller_name,
                    status: $status,
                    admin_id: NONE,
                    created_at: $created_at
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("item_rid", item_rid))
            .bind(("account_rid", account_id(buyer_id)))
            .bind(("seller_rid", account_id(seller_id)))
            .bind(("order_rid", order_rid))
            .bind(("item_key", item_id.to_string()))
            .bind(("buyer_id", buyer_id))
            .bind(("buyer_name", buyer_name.to_string()))
            .bind(("status", initial_status))
            .bind(("created_at", Utc::now()))
            .await
            .map_err(RepoError::from)?
            .check();

        if let Err(err) = result {
            return Err(if thrown(&err, "tx_item_not_found") {
                PurchaseTxError::ItemNotFound
            } else if thrown(&err, "tx_already_sold") {
                PurchaseTxError::AlreadySold
            } else if thrown(&err, "tx_account_missing") {
                PurchaseTxError::AccountMissing
            } else if thrown(&err, "tx_insufficient_balance") {
                PurchaseTxError::InsufficientBalance
            } else {
                PurchaseTxError::Repo(RepoError::from(err))
            });
        }

        let order = self.find_by_id(&order_key).await?;
        order.ok_or_else(|| {
            PurchaseTxError::Repo(RepoError::Database(
                "purchase committed but order is missing".into(),
            ))
        })
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<OrderRecord>> {
        let order: Option<OrderRecord> = self.base.db().select((ORDER_TABLE, id)).await?;
        Ok(order)
    }

    /// Active (not yet confirmed) orders for one buyer.
    pub async fn find_active_by_buyer(&self, buyer_id: i64) -> RepoResult<Vec<OrderRecord>> {
        let orders: Vec<OrderRecord> = self
            .base
            .db()
            .query(
                "SELECT * FROM shop_order WHERE buyer_id = $buyer_id AND status != 'confirmed' \
                 ORDER BY created_at DESC",
            )
            .bind(("buyer_id", buyer_id))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All active orders (admin dashboard).
    pub async fn find_active(&self) -> RepoResult<Vec<OrderRecord>> {
        let orders: Vec<OrderRecord> = self
            .base
            .db()
            .query("SELECT * FROM shop_order WHERE status != 'confirmed' ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Conditional claim: succeeds only while the order is still pending.
    /// Returns `None` when the race was lost; the caller re-reads the order
    /// to report who holds it.
    pub async fn try_claim(&self, order_id: &str, admin_id: i64) -> RepoResult<Option<OrderRecord>> {
        let orders: Vec<OrderRecord> = self
            .base
            .db()
            .query(
                "UPDATE $order_rid SET status = 'claimed', admin_id = $admin_id \
                 WHERE status = 'pending' RETURN AFTER",
            )
            .bind(("order_rid", RecordId::from_table_key(ORDER_TABLE, order_id)))
            .bind(("admin_id", admin_id))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Completion transaction: flip claimed → completed and credit the
    /// seller in one commit. The seller account must already exist.
    pub async fn complete_and_pay(
        &self,
        order_id: &str,
        admin_id: i64,
        seller_id: i64,
    ) -> Result<OrderRecord, CompleteTxError> {
        let order_rid = RecordId::from_table_key(ORDER_TABLE, order_id);

        let result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $order = (SELECT * FROM $order_rid)[0];
                IF $order IS NONE { THROW "tx_order_not_found" };
                IF $order.status != 'claimed' { THROW "tx_wrong_state" };
                IF $order.admin_id != $admin_id { THROW "tx_not_claimant" };
                UPDATE $order_rid SET status = 'completed';
                UPDATE $seller_rid SET balance += $order.price;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("order_rid", order_rid))
            .bind(("admin_id", admin_id))
            .bind(("seller_rid", account_id(seller_id)))
            .await
            .map_err(RepoError::from)?
            .check();

        if let Err(err) = result {
            return Err(if thrown(&err, "tx_order_not_found") {
                CompleteTxError::OrderNotFound
            } else if thrown(&err, "tx_wrong_state") {
                CompleteTxError::WrongState
            } else if thrown(&err, "tx_not_claimant") {
                CompleteTxError::NotClaimant
            } else {
                CompleteTxError::Repo(RepoError::from(err))
            });
        }

        let order = self.find_by_id(order_id).await?;
        order.ok_or_else(|| {
            CompleteTxError::Repo(RepoError::Database(
                "completion committed but order is missing".into(),
            ))
        })
    }

    /// Conditional buyer confirmation: completed → confirmed, only for the
    /// recorded buyer. Returns `None` when the guard did not match.
    pub async fn try_confirm(
        &self,
        order_id: &str,
        buyer_id: i64,
    ) -> RepoResult<Option<OrderRecord>> {
        let orders: Vec<OrderRecord> = self
            .base
            .db()
            .query(
                "UPDATE $order_rid SET status = 'confirmed' \
                 WHERE status = 'completed' AND buyer_id = $buyer_id RETURN AFTER",
            )
            .bind(("order_rid", RecordId::from_table_key(ORDER_TABLE, order_id)))
            .bind(("buyer_id", buyer_id))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }
}
