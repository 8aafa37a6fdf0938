//! Shared fixtures for integration tests: in-memory store, recording
//! channel, and a fully wired server state.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Value, json};

use souq_server::core::{Config, ServerState};
use souq_server::db::DbService;
use souq_server::db::models::{ItemCreate, ItemRecord};
use souq_server::notify::{NotificationChannel, RecordingChannel};
use shared::DeliveryMode;

pub const OWNER: i64 = 900;
pub const SELLER: i64 = 10;
pub const BUYER: i64 = 20;
pub const ADMIN_PASS: &str = "test-admin-pass";

pub fn test_config() -> Config {
    Config {
        bot_token: String::new(),
        admin_id: OWNER,
        site_url: "http://localhost:3000".into(),
        secret_key: "integration-test-secret-key-32-bytes!".into(),
        admin_pass: ADMIN_PASS.into(),
        http_port: 0,
        data_dir: ".".into(),
        log_level: "warn".into(),
        session_minutes: 30,
    }
}

pub async fn test_state() -> (ServerState, Arc<RecordingChannel>) {
    let db = DbService::memory().await.expect("in-memory db");
    let channel = Arc::new(RecordingChannel::new());
    let state = ServerState::initialize(
        test_config(),
        db,
        channel.clone() as Arc<dyn NotificationChannel>,
    )
    .await
    .expect("state");
    (state, channel)
}

pub async fn seed_item(state: &ServerState, price: i64, mode: DeliveryMode) -> ItemRecord {
    state
        .items
        .create(
            ItemCreate {
                name: "steam key".into(),
                price: Decimal::new(price, 0),
                seller_id: SELLER,
                seller_name: "seller".into(),
                category: "games".into(),
                hidden_payload: "XXXX-YYYY-ZZZZ".into(),
                delivery_mode: Some(mode),
            },
            mode,
        )
        .await
        .expect("seed item")
}

pub async fn seed_balance(state: &ServerState, user_id: i64, amount: i64) {
    state
        .users
        .get_or_create(user_id, "user")
        .await
        .expect("account");
    if amount > 0 {
        state
            .users
            .credit(user_id, Decimal::new(amount, 0))
            .await
            .expect("credit");
    }
}

pub async fn balance(state: &ServerState, user_id: i64) -> Decimal {
    state
        .users
        .find(user_id)
        .await
        .expect("find account")
        .map(|a| a.balance)
        .unwrap_or_default()
}

/// Webhook update carrying a plain text message.
pub fn webhook_message(user_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "from": { "id": user_id, "first_name": "user" },
            "chat": { "id": user_id },
            "text": text
        }
    })
}

/// Webhook update carrying an inline-button press.
pub fn webhook_callback(user_id: i64, data: &str) -> Value {
    json!({
        "update_id": 2,
        "callback_query": {
            "id": "cb1",
            "from": { "id": user_id, "first_name": "user" },
            "data": data
        }
    })
}

/// Decode a response body into JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Build a JSON POST request.
pub fn post_json(uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request")
}

/// Build a GET request.
pub fn get(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("request")
}
