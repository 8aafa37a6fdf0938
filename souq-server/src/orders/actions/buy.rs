//! Buy action
//!
//! Entry point of the lifecycle. Guards (not sold, balance covers price,
//! buyer reachable) run before the store transaction; the transaction
//! re-checks them so a concurrent buyer cannot slip through. Notifications
//! fire only after the commit and are non-fatal.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::db::models::OrderRecord;
use crate::db::repository::order::PurchaseTxError;
use crate::notify::{InlineButton, InlineKeyboard, broadcast};
use crate::orders::traits::{OrderAction, OrderContext, OrderError};
use shared::{DeliveryMode, OrderStatus};

#[derive(Debug, Clone)]
pub struct BuyAction {
    pub item_id: String,
    pub buyer_id: i64,
    pub buyer_name: String,
}

#[derive(Debug, Clone)]
pub struct BuyOutcome {
    pub order: OrderRecord,
    pub new_balance: Decimal,
}

#[async_trait]
impl OrderAction for BuyAction {
    type Output = BuyOutcome;

    async fn execute(&self, ctx: &OrderContext) -> Result<BuyOutcome, OrderError> {
        // 1. Fetch the item; a buy needs the authoritative record, so no
        //    mirror fallback here.
        let item = ctx
            .items
            .find_by_id(&self.item_id)
            .await?
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;

        // 2. Sold guard - user-facing "already sold", not a generic error.
        if item.sold {
            return Err(OrderError::AlreadySold(item.name.clone()));
        }

        // 3. Balance guard.
        let account = ctx
            .users
            .get_or_create(self.buyer_id, &self.buyer_name)
            .await?;
        if account.balance < item.price {
            return Err(OrderError::InsufficientBalance {
                price: item.price,
                balance: account.balance,
            });
        }

        // 4. Reachability probe - abort before any monetary mutation if the
        //    buyer could never receive the goods.
        if !ctx.channel.probe_reachable(self.buyer_id).await {
            return Err(OrderError::BuyerUnreachable(self.buyer_id));
        }

        // 5. The atomic purchase: debit + sold flip + order create. An
        //    instant sale also pays the seller in the same commit, so the
        //    seller account must exist first.
        let initial_status = match item.delivery_mode {
            DeliveryMode::Instant => OrderStatus::Completed,
            DeliveryMode::Manual => OrderStatus::Pending,
        };
        if initial_status == OrderStatus::Completed {
            ctx.users
                .get_or_create(item.seller_id, &item.seller_name)
                .await?;
        }
        let order = ctx
            .orders
            .create_via_purchase(
                &self.item_id,
                self.buyer_id,
                &self.buyer_name,
                initial_status,
                item.seller_id,
            )
            .await
            .map_err(|e| match e {
                PurchaseTxError::ItemNotFound => OrderError::ItemNotFound(self.item_id.clone()),
                PurchaseTxError::AlreadySold => OrderError::AlreadySold(item.name.clone()),
                PurchaseTxError::InsufficientBalance => OrderError::InsufficientBalance {
                    price: item.price,
                    balance: account.balance,
                },
                PurchaseTxError::AccountMissing => {
                    OrderError::Store("buyer account vanished mid-purchase".into())
                }
                PurchaseTxError::Repo(e) => OrderError::Store(e.to_string()),
            })?;

        // 6. Invalidate mirror entries touched by the commit.
        ctx.mirror.forget_item(&self.item_id);
        ctx.mirror.forget_balance(self.buyer_id);
        if initial_status == OrderStatus::Completed {
            ctx.mirror.forget_balance(item.seller_id);
        }

        // The transaction owns the authoritative figure; the pre-commit read
        // may be stale by the time the debit lands.
        let new_balance = ctx
            .users
            .find(self.buyer_id)
            .await?
            .map(|a| a.balance)
            .unwrap_or(account.balance - item.price);
        tracing::info!(
            order_id = %order.key(),
            item_id = %self.item_id,
            buyer_id = self.buyer_id,
            price = %item.price,
            status = %order.status,
            "purchase committed"
        );

        // 7. Post-commit notifications. Failures are logged and surfaced to
        //    admins; the order stays valid and payable.
        self.notify(ctx, &order).await;

        Ok(BuyOutcome { order, new_balance })
    }
}

impl BuyAction {
    async fn notify(&self, ctx: &OrderContext, order: &OrderRecord) {
        let order_key = order.key();
        let delivered = match order.delivery_mode {
            DeliveryMode::Instant => {
                let text = format!(
                    "✅ Purchase complete: {}\n\n{}\n\nTap confirm once everything works.",
                    order.item_name, order.hidden_payload
                );
                let keyboard = InlineKeyboard::default().row(vec![InlineButton::callback(
                    "✔ Confirm receipt",
                    format!("confirm_{order_key}"),
                )]);
                let buyer_ok = ctx
                    .channel
                    .send_with_keyboard(self.buyer_id, &text, keyboard)
                    .await;
                ctx.channel
                    .send(
                        order.seller_id,
                        &format!(
                            "💰 Your item '{}' sold for {}. The amount was credited to your balance.",
                            order.item_name, order.price
                        ),
                    )
                    .await;
                buyer_ok
            }
            DeliveryMode::Manual => {
                let buyer_ok = ctx
                    .channel
                    .send(
                        self.buyer_id,
                        &format!(
                            "🕐 Order received: {}. An admin will deliver it shortly.",
                            order.item_name
                        ),
                    )
                    .await;
                let admin_ids = ctx.admins.admin_ids().await;
                let keyboard = InlineKeyboard::default().row(vec![InlineButton::callback(
                    "📦 Claim order",
                    format!("claim_{order_key}"),
                )]);
                let text = format!(
                    "🆕 New order {order_key}\nItem: {}\nPrice: {}\nBuyer: {} ({})",
                    order.item_name, order.price, order.buyer_name, order.buyer_id
                );
                for admin_id in admin_ids {
                    if !ctx
                        .channel
                        .send_with_keyboard(admin_id, &text, keyboard.clone())
                        .await
                    {
                        tracing::warn!(admin_id, order_id = %order_key, "admin order alert failed");
                    }
                }
                buyer_ok
            }
        };

        if !delivered {
            tracing::warn!(order_id = %order_key, buyer_id = self.buyer_id, "buyer notification failed after commit");
            let admin_ids = ctx.admins.admin_ids().await;
            broadcast(
                &ctx.channel,
                &admin_ids,
                &format!(
                    "⚠️ Order {order_key} committed but the buyer could not be notified, deliver manually."
                ),
            )
            .await;
        }
    }
}
