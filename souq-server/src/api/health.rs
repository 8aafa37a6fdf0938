//! Health check route

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppResponse, ok};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store: &'static str,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// GET /health - liveness plus a cheap store probe.
async fn health(State(state): State<ServerState>) -> Json<AppResponse<Health>> {
    let store = match state.db.query("RETURN 1").await {
        Ok(_) => "up",
        Err(_) => "down",
    };
    ok(Health {
        status: "ok",
        store,
    })
}
