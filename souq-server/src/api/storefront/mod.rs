//! Storefront API module
//!
//! Public routes plus the session-scoped wallet and purchase views. The
//! `/buy`, `/charge_balance`, and `/verify` responses keep the shapes the
//! storefront front-end already consumes.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::storefront))
        .route("/wallet", get(handler::wallet))
        .route("/my_purchases", get(handler::my_purchases))
        .route("/buy", post(handler::buy))
        .route("/charge_balance", post(handler::charge_balance))
        .route("/verify", post(handler::verify))
        .route("/get_balance", get(handler::get_balance))
        .route("/get_orders", get(handler::get_orders))
}
