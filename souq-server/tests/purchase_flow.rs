//! End-to-end purchase flow over the HTTP surface and the lifecycle
//! actions, against the in-memory store and the recording channel.

mod common;

use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

use common::{ADMIN_PASS, BUYER, OWNER, SELLER, balance, body_json, get, post_json, seed_balance, seed_item, test_state};
use souq_server::api;
use souq_server::orders::{ClaimAction, CompleteAction, ConfirmAction, OrderAction};
use shared::{DeliveryMode, OrderStatus};

#[tokio::test]
async fn storefront_hides_payloads_and_sold_items() {
    let (state, _channel) = test_state().await;
    let available = seed_item(&state, 25, DeliveryMode::Instant).await;
    let sold = seed_item(&state, 40, DeliveryMode::Instant).await;
    seed_balance(&state, BUYER, 100).await;

    let app = api::build_app(&state);
    let buy = app
        .clone()
        .oneshot(post_json(
            "/buy",
            json!({ "buyer_id": BUYER, "buyer_name": "buyer", "item_id": sold.key() }),
        ))
        .await
        .expect("buy response");
    assert_eq!(buy.status(), 200);

    let response = app.oneshot(get("/")).await.expect("storefront");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    let items = body["data"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], available.key());
    assert_eq!(items[0]["hidden_payload"], "");
}

#[tokio::test]
async fn buy_endpoint_returns_legacy_shape_for_instant_items() {
    let (state, _channel) = test_state().await;
    let item = seed_item(&state, 25, DeliveryMode::Instant).await;
    seed_balance(&state, BUYER, 30).await;

    let app = api::build_app(&state);
    let response = app
        .oneshot(post_json(
            "/buy",
            json!({ "buyer_id": BUYER, "buyer_name": "buyer", "item_id": item.key() }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["hidden_data"], "XXXX-YYYY-ZZZZ");
    assert_eq!(body["new_balance"].as_f64(), Some(5.0));
    assert!(body["order_id"].as_str().is_some_and(|id| !id.is_empty()));

    assert_eq!(balance(&state, BUYER).await, Decimal::new(5, 0));
}

#[tokio::test]
async fn buy_with_insufficient_balance_is_a_structured_error() {
    let (state, _channel) = test_state().await;
    let item = seed_item(&state, 25, DeliveryMode::Instant).await;
    seed_balance(&state, BUYER, 10).await;

    let app = api::build_app(&state);
    let response = app
        .oneshot(post_json(
            "/buy",
            json!({ "buyer_id": BUYER, "buyer_name": "buyer", "item_id": item.key() }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), 422);

    let body = body_json(response).await;
    assert_eq!(body["code"], "E1003");

    assert_eq!(balance(&state, BUYER).await, Decimal::new(10, 0));
    let stored = state
        .items
        .find_by_id(&item.key())
        .await
        .expect("find")
        .expect("item");
    assert!(!stored.sold);
}

#[tokio::test]
async fn manual_lifecycle_ends_with_confirmed_order_and_paid_seller() {
    let (state, channel) = test_state().await;
    let item = seed_item(&state, 25, DeliveryMode::Manual).await;
    seed_balance(&state, BUYER, 30).await;

    let app = api::build_app(&state);
    let response = app
        .oneshot(post_json(
            "/buy",
            json!({ "buyer_id": BUYER, "buyer_name": "buyer", "item_id": item.key() }),
        ))
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    let order_id = body["order_id"].as_str().expect("order id").to_string();

    let ctx = state.order_context();
    ClaimAction {
        order_id: order_id.clone(),
        admin_id: OWNER,
    }
    .execute(&ctx)
    .await
    .expect("claim");
    CompleteAction {
        order_id: order_id.clone(),
        admin_id: OWNER,
    }
    .execute(&ctx)
    .await
    .expect("complete");
    ConfirmAction {
        order_id: order_id.clone(),
        buyer_id: BUYER,
    }
    .execute(&ctx)
    .await
    .expect("confirm");

    let order = state
        .orders
        .find_by_id(&order_id)
        .await
        .expect("find")
        .expect("order");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(balance(&state, SELLER).await, Decimal::new(25, 0));
    assert!(state.orders.find_active().await.expect("active").is_empty());

    // Buyer got the payload at completion time.
    let buyer_msgs = channel.sent_to(BUYER);
    assert!(buyer_msgs.iter().any(|m| m.text.contains("XXXX-YYYY-ZZZZ")));
}

#[tokio::test]
async fn verify_issues_a_session_cookie_that_scopes_reads() {
    let (state, _channel) = test_state().await;
    seed_balance(&state, BUYER, 50).await;
    let code = state.verify_codes.issue(BUYER, "buyer");

    let app = api::build_app(&state);
    let response = app
        .clone()
        .oneshot(post_json(
            "/verify",
            json!({ "user_id": BUYER, "code": code }),
        ))
        .await
        .expect("verify response");
    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("session cookie")
        .to_str()
        .expect("cookie str")
        .to_string();
    assert!(cookie.starts_with("tr_session="));
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["balance"].as_f64(), Some(50.0));

    let pair = cookie.split(';').next().expect("cookie pair");
    let request = axum::http::Request::builder()
        .uri("/get_balance")
        .header("cookie", pair)
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("balance response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["balance"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn wrong_verification_code_establishes_nothing() {
    let (state, _channel) = test_state().await;
    state.verify_codes.issue(BUYER, "buyer");

    let app = api::build_app(&state);
    let response = app
        .clone()
        .oneshot(post_json(
            "/verify",
            json!({ "user_id": BUYER, "code": "000000" }),
        ))
        .await
        .expect("verify response");
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("set-cookie").is_none());
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // Session-scoped reads stay closed.
    let response = app.oneshot(get("/get_balance")).await.expect("response");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn admin_api_requires_the_password() {
    let (state, _channel) = test_state().await;
    let app = api::build_app(&state);

    let response = app
        .clone()
        .oneshot(get("/api/admin/dashboard"))
        .await
        .expect("response");
    assert_eq!(response.status(), 403);

    let request = axum::http::Request::builder()
        .uri("/api/admin/dashboard")
        .header("x-admin-pass", ADMIN_PASS)
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");

    // The top-level alias serves the same gated dashboard.
    let response = app
        .clone()
        .oneshot(get("/dashboard"))
        .await
        .expect("response");
    assert_eq!(response.status(), 403);
    let request = axum::http::Request::builder()
        .uri("/dashboard")
        .header("x-admin-pass", ADMIN_PASS)
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
}
