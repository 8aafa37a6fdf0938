//! API route module
//!
//! # Structure
//!
//! - [`storefront`] - public listing, purchase, top-up, session verification
//! - [`admin`] - password-gated CRUD and dashboard under `/api/admin`
//! - [`webhook`] - inbound bot updates
//! - [`health`] - liveness
//! - [`session`] - cookie sessions (extractor + sliding refresh)
//! - [`convert`] - record to wire-model conversion

pub mod convert;

pub mod admin;
pub mod health;
pub mod session;
pub mod storefront;
pub mod webhook;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware).
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(storefront::router())
        .merge(admin::router())
        .merge(webhook::router())
        .merge(health::router())
}

/// Build the fully configured application with middleware and state.
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // CORS - the storefront front-end may be served from elsewhere
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // Request tracing
        .layer(TraceLayer::new_for_http())
        // Unique id per request, propagated to the response
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Sliding session renewal
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session::sliding_refresh,
        ))
        .with_state(state.clone())
}
