//! Admin API module
//!
//! CRUD for items and categories, balance credits, charge-key minting, and
//! the orders dashboard. Every route is guarded by the [`AdminGate`]
//! extractor checking the `x-admin-pass` header against `ADMIN_PASS`.

mod handler;

pub use handler::AdminGate;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // Legacy top-level alias kept for existing dashboard clients.
        .route("/dashboard", get(handler::dashboard))
        .nest("/api/admin", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/items", get(handler::list_items).post(handler::create_item))
        .route("/items/{id}", axum::routing::delete(handler::delete_item))
        .route(
            "/categories",
            get(handler::list_categories).post(handler::create_category),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(handler::update_category).delete(handler::delete_category),
        )
        .route("/credit", post(handler::credit))
        .route("/charge_keys", get(handler::list_keys).post(handler::mint_keys))
        .route("/orders", get(handler::list_orders))
        .route("/orders/{id}/claim", post(handler::claim_order))
        .route("/orders/{id}/complete", post(handler::complete_order))
}
