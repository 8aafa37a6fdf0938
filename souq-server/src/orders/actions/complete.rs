//! Complete action
//!
//! The claiming admin marks a manual order delivered. The state flip and the
//! seller payout commit together; afterwards the buyer gets the payload with
//! a confirm button and the seller is told about the credit.

use async_trait::async_trait;

use crate::db::models::OrderRecord;
use crate::db::repository::order::CompleteTxError;
use crate::notify::{InlineButton, InlineKeyboard};
use crate::orders::traits::{OrderAction, OrderContext, OrderError};
use shared::OrderStatus;

#[derive(Debug, Clone)]
pub struct CompleteAction {
    pub order_id: String,
    pub admin_id: i64,
}

#[async_trait]
impl OrderAction for CompleteAction {
    type Output = OrderRecord;

    async fn execute(&self, ctx: &OrderContext) -> Result<OrderRecord, OrderError> {
        if !ctx.admins.is_admin(self.admin_id).await {
            return Err(OrderError::NotAdmin);
        }

        let order = ctx
            .orders
            .find_by_id(&self.order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(self.order_id.clone()))?;

        if order.status != OrderStatus::Claimed {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Completed,
            });
        }
        if order.admin_id != Some(self.admin_id) {
            return Err(OrderError::NotClaimant);
        }

        // The payout needs a seller account to credit.
        ctx.users
            .get_or_create(order.seller_id, &order.seller_name)
            .await?;

        let completed = ctx
            .orders
            .complete_and_pay(&self.order_id, self.admin_id, order.seller_id)
            .await
            .map_err(|e| match e {
                CompleteTxError::OrderNotFound => OrderError::OrderNotFound(self.order_id.clone()),
                CompleteTxError::WrongState => OrderError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Completed,
                },
                CompleteTxError::NotClaimant => OrderError::NotClaimant,
                CompleteTxError::Repo(e) => OrderError::Store(e.to_string()),
            })?;

        ctx.mirror.forget_balance(completed.seller_id);

        tracing::info!(
            order_id = %self.order_id,
            admin_id = self.admin_id,
            seller_id = completed.seller_id,
            price = %completed.price,
            "order completed, seller credited"
        );

        let buyer_text = format!(
            "✅ Order delivered: {}\n\n{}\n\nTap confirm once everything works.",
            completed.item_name, completed.hidden_payload
        );
        let keyboard = InlineKeyboard::default().row(vec![InlineButton::callback(
            "✔ Confirm receipt",
            format!("confirm_{}", self.order_id),
        )]);
        if !ctx
            .channel
            .send_with_keyboard(completed.buyer_id, &buyer_text, keyboard)
            .await
        {
            tracing::warn!(order_id = %self.order_id, buyer_id = completed.buyer_id, "buyer delivery message failed");
        }
        ctx.channel
            .send(
                completed.seller_id,
                &format!(
                    "💰 Your item '{}' sold for {}. The amount was credited to your balance.",
                    completed.item_name, completed.price
                ),
            )
            .await;

        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testkit::{BUYER, OWNER, SECOND_ADMIN, SELLER, rig};
    use crate::orders::{BuyAction, ClaimAction, OrderAction};
    use rust_decimal::Decimal;
    use shared::DeliveryMode;

    async fn claimed_order(rig: &crate::orders::actions::testkit::TestRig) -> String {
        let item = rig.seed_item(25, DeliveryMode::Manual).await;
        rig.seed_balance(BUYER, 30).await;
        let order_id = BuyAction {
            item_id: item.key(),
            buyer_id: BUYER,
            buyer_name: "buyer".into(),
        }
        .execute(&rig.ctx)
        .await
        .expect("buy")
        .order
        .key();
        ClaimAction {
            order_id: order_id.clone(),
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect("claim");
        order_id
    }

    #[tokio::test]
    async fn complete_credits_seller_and_delivers_payload() {
        let rig = rig().await;
        let order_id = claimed_order(&rig).await;

        let completed = CompleteAction {
            order_id: order_id.clone(),
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect("complete");

        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(rig.balance(SELLER).await, Decimal::new(25, 0));

        let buyer_msgs = rig.channel.sent_to(BUYER);
        let delivered = buyer_msgs
            .iter()
            .find(|m| m.text.contains("hunter2"))
            .expect("payload sent to buyer");
        assert!(delivered.keyboard.is_some());
    }

    #[tokio::test]
    async fn only_the_claiming_admin_can_complete() {
        let rig = rig().await;
        let order_id = claimed_order(&rig).await;

        let err = CompleteAction {
            order_id: order_id.clone(),
            admin_id: SECOND_ADMIN,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("must fail");

        assert!(matches!(err, OrderError::NotClaimant));
        assert_eq!(rig.balance(SELLER).await, Decimal::ZERO);

        let order = rig
            .ctx
            .orders
            .find_by_id(&order_id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.status, OrderStatus::Claimed);
    }

    #[tokio::test]
    async fn completing_an_unclaimed_order_fails() {
        let rig = rig().await;
        let item = rig.seed_item(25, DeliveryMode::Manual).await;
        rig.seed_balance(BUYER, 30).await;
        let order_id = BuyAction {
            item_id: item.key(),
            buyer_id: BUYER,
            buyer_name: "buyer".into(),
        }
        .execute(&rig.ctx)
        .await
        .expect("buy")
        .order
        .key();

        let err = CompleteAction {
            order_id,
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("must fail");

        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Completed
            }
        ));
    }

    #[tokio::test]
    async fn completing_twice_fails_without_double_payout() {
        let rig = rig().await;
        let order_id = claimed_order(&rig).await;

        CompleteAction {
            order_id: order_id.clone(),
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect("first complete");

        let err = CompleteAction {
            order_id,
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("second complete must fail");

        assert!(matches!(err, OrderError::InvalidTransition { .. }));
        assert_eq!(rig.balance(SELLER).await, Decimal::new(25, 0));
    }
}
