//! Charge-key redemption: atomicity of the double-redeem guard, the legacy
//! HTTP endpoint, and the bot command path through the webhook.

mod common;

use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

use common::{BUYER, OWNER, balance, body_json, post_json, test_state, webhook_message};
use souq_server::api;

const USER_A: i64 = 31;
const USER_B: i64 = 32;

#[tokio::test]
async fn a_key_credits_exactly_once() {
    let (state, _channel) = test_state().await;
    let codes = state
        .charge_keys
        .generate(Decimal::new(50, 0), 1)
        .await
        .expect("mint");
    let code = &codes[0];

    let credited = state
        .charge_keys
        .redeem(code, USER_A, "a")
        .await
        .expect("first redeem");
    assert_eq!(credited, Decimal::new(50, 0));
    assert_eq!(balance(&state, USER_A).await, Decimal::new(50, 0));

    let err = state
        .charge_keys
        .redeem(code, USER_B, "b")
        .await
        .expect_err("second redeem must fail");
    assert!(matches!(err, souq_server::AppError::AlreadyUsed(_)));
    assert_eq!(balance(&state, USER_A).await, Decimal::new(50, 0));
    assert_eq!(balance(&state, USER_B).await, Decimal::ZERO);

    let key = state
        .charge_keys
        .find(code)
        .await
        .expect("find")
        .expect("key");
    assert!(key.used);
    assert_eq!(key.used_by, Some(USER_A));
}

#[tokio::test]
async fn redemption_writes_a_statement_entry() {
    let (state, _channel) = test_state().await;
    let codes = state
        .charge_keys
        .generate(Decimal::new(20, 0), 1)
        .await
        .expect("mint");
    state
        .charge_keys
        .redeem(&codes[0], USER_A, "a")
        .await
        .expect("redeem");

    let history = state.charge_keys.history(USER_A).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, Decimal::new(20, 0));
    assert_eq!(history[0].code, codes[0]);
}

#[tokio::test]
async fn charge_balance_endpoint_keeps_the_legacy_shape() {
    let (state, _channel) = test_state().await;
    let codes = state
        .charge_keys
        .generate(Decimal::new(50, 0), 1)
        .await
        .expect("mint");

    let app = api::build_app(&state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/charge_balance",
            json!({ "user_id": BUYER, "charge_key": "SQ-DOESNOTEXIST" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let response = app
        .clone()
        .oneshot(post_json(
            "/charge_balance",
            json!({ "user_id": BUYER, "charge_key": codes[0] }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["new_balance"].as_f64(), Some(50.0));

    // Replay through the endpoint fails softly.
    let response = app
        .oneshot(post_json(
            "/charge_balance",
            json!({ "user_id": USER_B, "charge_key": codes[0] }),
        ))
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(balance(&state, USER_B).await, Decimal::ZERO);
}

#[tokio::test]
async fn bot_redeems_a_key_over_the_webhook() {
    let (state, channel) = test_state().await;
    let codes = state
        .charge_keys
        .generate(Decimal::new(50, 0), 1)
        .await
        .expect("mint");

    let app = api::build_app(&state);
    let response = app
        .clone()
        .oneshot(post_json(
            "/webhook",
            webhook_message(BUYER, &format!("/شحن {}", codes[0])),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    assert_eq!(balance(&state, BUYER).await, Decimal::new(50, 0));
    let replies = channel.sent_to(BUYER);
    assert!(replies.iter().any(|m| m.text.contains("redeemed")));

    // Replaying the same command reports the used key.
    let response = app
        .oneshot(post_json(
            "/webhook",
            webhook_message(USER_B, &format!("/شحن {}", codes[0])),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    assert_eq!(balance(&state, USER_B).await, Decimal::ZERO);
    let replies = channel.sent_to(USER_B);
    assert!(replies.iter().any(|m| m.text.contains("already used")));
}

#[tokio::test]
async fn only_admins_can_mint_keys_over_the_bot() {
    let (state, channel) = test_state().await;
    let app = api::build_app(&state);

    let response = app
        .clone()
        .oneshot(post_json("/webhook", webhook_message(BUYER, "/توليد 50 2")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let replies = channel.sent_to(BUYER);
    assert!(replies.iter().any(|m| m.text.contains("admins")));

    let response = app
        .oneshot(post_json("/webhook", webhook_message(OWNER, "/توليد 50 2")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let replies = channel.sent_to(OWNER);
    let minted = replies
        .iter()
        .find(|m| m.text.contains("Minted"))
        .expect("mint reply");
    assert_eq!(minted.text.matches("SQ-").count(), 2);
}
