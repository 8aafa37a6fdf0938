//! Claim action
//!
//! Manual-path only: an admin takes ownership of a pending order. The claim
//! is a conditional update, so two admins racing for the same order resolve
//! in the store - the loser is told who holds it.

use async_trait::async_trait;

use crate::db::models::OrderRecord;
use crate::notify::{InlineButton, InlineKeyboard};
use crate::orders::traits::{OrderAction, OrderContext, OrderError};
use shared::OrderStatus;

#[derive(Debug, Clone)]
pub struct ClaimAction {
    pub order_id: String,
    pub admin_id: i64,
}

#[async_trait]
impl OrderAction for ClaimAction {
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

        if !order.status.can_transition(OrderStatus::Claimed) {
            // A second claim must fail visibly, naming the holder.
            return Err(match order.admin_id {
                Some(holder) => OrderError::AlreadyClaimed {
                    order_id: self.order_id.clone(),
                    holder,
                },
                None => OrderError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Claimed,
                },
            });
        }

        let claimed = match ctx.orders.try_claim(&self.order_id, self.admin_id).await? {
            Some(updated) => updated,
            None => {
                // Race lost between the read above and the conditional
                // update; report the actual holder.
                let current = ctx
                    .orders
                    .find_by_id(&self.order_id)
                    .await?
                    .ok_or_else(|| OrderError::OrderNotFound(self.order_id.clone()))?;
                return Err(match current.admin_id {
                    Some(holder) => OrderError::AlreadyClaimed {
                        order_id: self.order_id.clone(),
                        holder,
                    },
                    None => OrderError::InvalidTransition {
                        from: current.status,
                        to: OrderStatus::Claimed,
                    },
                });
            }
        };

        tracing::info!(order_id = %self.order_id, admin_id = self.admin_id, "order claimed");

        // Hidden payload goes to the claiming admin only; the other admins'
        // claim prompts are superseded by a notice. The complete button on
        // this message is the only bot path to the completed state.
        let payload_text = format!(
            "📦 You claimed order {}\nItem: {}\nBuyer: {} ({})\n\nPayload:\n{}\n\nComplete once delivered.",
            self.order_id, claimed.item_name, claimed.buyer_name, claimed.buyer_id, claimed.hidden_payload
        );
        let keyboard = InlineKeyboard::default().row(vec![InlineButton::callback(
            "✅ Complete order",
            format!("complete_{}", self.order_id),
        )]);
        if !ctx
            .channel
            .send_with_keyboard(self.admin_id, &payload_text, keyboard)
            .await
        {
            tracing::warn!(admin_id = self.admin_id, order_id = %self.order_id, "payload delivery to claiming admin failed");
        }
        for other in ctx.admins.admin_ids().await {
            if other != self.admin_id {
                ctx.channel
                    .send(
                        other,
                        &format!(
                            "ℹ️ Order {} was claimed by admin {}.",
                            self.order_id, self.admin_id
                        ),
                    )
                    .await;
            }
        }

        Ok(claimed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testkit::{BUYER, OWNER, SECOND_ADMIN, rig};
    use crate::orders::{BuyAction, OrderAction};
    use shared::DeliveryMode;

    async fn pending_order(rig: &crate::orders::actions::testkit::TestRig) -> String {
        let item = rig.seed_item(25, DeliveryMode::Manual).await;
        rig.seed_balance(BUYER, 30).await;
        let outcome = BuyAction {
            item_id: item.key(),
            buyer_id: BUYER,
            buyer_name: "buyer".into(),
        }
        .execute(&rig.ctx)
        .await
        .expect("buy");
        outcome.order.key()
    }

    #[tokio::test]
    async fn claim_sets_admin_and_releases_payload_to_claimer_only() {
        let rig = rig().await;
        let order_id = pending_order(&rig).await;

        let claimed = ClaimAction {
            order_id: order_id.clone(),
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect("claim");

        assert_eq!(claimed.status, OrderStatus::Claimed);
        assert_eq!(claimed.admin_id, Some(OWNER));

        let owner_msgs = rig.channel.sent_to(OWNER);
        let payload_msg = owner_msgs
            .iter()
            .find(|m| m.text.contains("hunter2"))
            .expect("payload sent to claimer");
        // The payload message carries the button driving claimed → completed.
        let keyboard = payload_msg.keyboard.as_ref().expect("complete keyboard");
        let expected = format!("complete_{order_id}");
        assert!(
            keyboard
                .inline_keyboard
                .iter()
                .flatten()
                .any(|b| b.callback_data.as_deref() == Some(expected.as_str()))
        );
        let other_msgs = rig.channel.sent_to(SECOND_ADMIN);
        assert!(other_msgs.iter().all(|m| !m.text.contains("hunter2")));
    }

    #[tokio::test]
    async fn second_claim_fails_and_names_the_holder() {
        let rig = rig().await;
        let order_id = pending_order(&rig).await;

        ClaimAction {
            order_id: order_id.clone(),
            admin_id: OWNER,
        }
        .execute(&rig.ctx)
        .await
        .expect("first claim");

        let err = ClaimAction {
            order_id: order_id.clone(),
            admin_id: SECOND_ADMIN,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("second claim must fail");

        assert!(matches!(err, OrderError::AlreadyClaimed { holder, .. } if holder == OWNER));

        let order = rig
            .ctx
            .orders
            .find_by_id(&order_id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.admin_id, Some(OWNER));
    }

    #[tokio::test]
    async fn non_admin_cannot_claim() {
        let rig = rig().await;
        let order_id = pending_order(&rig).await;

        let err = ClaimAction {
            order_id,
            admin_id: 4242,
        }
        .execute(&rig.ctx)
        .await
        .expect_err("claim must fail");

        assert!(matches!(err, OrderError::NotAdmin));
    }
}
