//! Confirm action
//!
//! Terminal transition: the buyer acknowledges receipt of a completed
//! order. Only the recorded buyer may confirm, and the conditional update
//! makes a repeated confirm a no-op failure rather than a state change.

use async_trait::async_trait;

use crate::db::models::OrderRecord;
use crate::orders::traits::{OrderAction, OrderContext, OrderError};
use shared::OrderStatus;

#[derive(Debug, Clone)]
pub struct ConfirmAction {
    pub order_id: String,
    pub buyer_id: i64,
}

#[async_trait]
impl OrderAction for ConfirmAction {
    type Output = OrderRecord;

    async fn execute(&self, ctx: &OrderContext) -> Result<OrderRecord, OrderError> {
        let order = ctx
            .orders
            .find_by_id(&self.order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(self.order_id.clone()))?;

        if order.buyer_id != self.buyer_id {
            return Err(OrderError::NotBuyer);
        }
        if !order.status.can_transition(OrderStatus::Confirmed) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Confirmed,
            });
        }

        let confirmed = match ctx.orders.try_confirm(&self.order_id, self.buyer_id).await? {
            Some(updated) => updated,
            None => {
                // Guard moved underneath us; re-read for the precise reason.
                let current = ctx
                    .orders
                    .find_by_id(&self.order_id)
                    .await?
                    .ok_or_else(|| OrderError::OrderNotFound(self.order_id.clone()))?;
                return Err(if current.buyer_id != self.buyer_id {
                    OrderError::NotBuyer
                } else {
                    OrderError::InvalidTransition {
                        from: current.status,
                        to: OrderStatus::Confirmed,
                    }
                });
            }
        };

        tracing::info!(order_id = %self.order_id, buyer_id = self.buyer_id, "order confirmed");

        ctx.channel
            .send(
                self.buyer_id,
                &format!("🎉 Order {} confirmed. Thank you!", self.order_id),
            )
            .await;
        if let Some(admin_id) = confirmed.admin_id {
            ctx.channel
                .send(
                    admin_id,
                    &format!("✔ Buyer confirmed order {}.", self.order_id),
                )
                .await;
        }

        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testkit::{BUYER, OWNER, rig};
    use crate::orders::{BuyAction, ClaimAction, CompleteAction, OrderAction};
    use shared::DeliveryMode;

    async fn completed_order(
        rig: &crate::orders::actions::testkit::TestRig,
        mode: DeliveryMode,
    ) -> String {
        let item = rig.seed_item(25, mode).await;
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
        if mode == DeliveryMode::Manual {
            ClaimAction {
                order_id: order_id.clone(),
                admin_id: OWNER,
            }
            .execute(&rig.ctx)
            .await
            .expect("claim");
            CompleteAction {
                order_id: order_id.clone(),
                admin_id: OWNER,
            }
            .execute(&rig.ctx)
            .await
            .expect("complete");
        }
        order_id
    }

    #[tokio::test]
    async fn buyer_confirms_a_completed_order() {
        let rig = rig().await;
        let order_id = completed_order(&rig, DeliveryMode::Instant).await;

        let confirmed = ConfirmAction {
            order_id: order_id.clone(),
            buyer_id: BUYER,
        }
        .execute(&rig.ctx)
        .await
        .expect("confirm");

        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert!(
            rig.ctx
                .orders
                .find_active_by_buyer(BUYER)
                .await
                .expect("orders")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn manual_order_confirm_notifies_the_claiming_admin() {
        let rig = rig().await;
        let order_id = completed_order(&rig, DeliveryMode::Manual).await;

        ConfirmAction {
            order_id: order_id.clone(),
            buyer_id: BUYER,
        }
        .execute(&rig.ctx)
        .await
        .expect("confirm");

        let owner_msgs = rig.channel.sent_to(OWNER);
        assert!(owner_msgs.iter().any(|m| m.text.contains("confirmed")));
    }

    #[tokio::test]
    async fn only_the_buyer_can_confirm() {
        let rig = rig().await;
        let order_id = completed_order(&rig, DeliveryMode::Instant).await;

        let err = ConfirmAction {
            order_id: order_id.clone(),
            buyer_id: 777,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("must fail");

        assert!(matches!(err, OrderError::NotBuyer));

        let order = rig
            .ctx
            .orders
            .find_by_id(&order_id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn confirming_a_pending_order_fails() {
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

        let err = ConfirmAction {
            order_id,
            buyer_id: BUYER,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("must fail");

        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Confirmed
            }
        ));
    }

    #[tokio::test]
    async fn double_confirm_fails() {
        let rig = rig().await;
        let order_id = completed_order(&rig, DeliveryMode::Instant).await;

        ConfirmAction {
            order_id: order_id.clone(),
            buyer_id: BUYER,
        }
        .execute(&rig.ctx)
        .await
        .expect("first confirm");

        let err = ConfirmAction {
            order_id,
            buyer_id: BUYER,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("second confirm must fail");

        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Confirmed
            }
        ));
    }
}
