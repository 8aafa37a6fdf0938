//! Bot webhook route
//!
//! Inbound Bot API updates. The route always answers 200: a failed update
//! is logged and dropped, never redelivered by the Bot API in a retry loop.

use axum::{Json, Router, extract::State, routing::post};
use serde_json::Value;

use crate::bot::{self, Update};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/webhook", post(webhook))
}

/// POST /webhook
async fn webhook(State(state): State<ServerState>, Json(payload): Json<Value>) {
    match serde_json::from_value::<Update>(payload) {
        Ok(update) => bot::dispatch(&state, update).await,
        Err(e) => tracing::warn!(error = %e, "unparseable webhook update"),
    }
}
