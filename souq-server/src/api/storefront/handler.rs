//! Storefront API Handlers

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::{Json, http::HeaderValue};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::session::SessionUser;
use crate::core::ServerState;
use crate::orders::{BuyAction, OrderAction};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::{Category, ChargeHistoryEntry, Item, Order, OrderStatus};

// =============================================================================
// Storefront listing
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Storefront {
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
}

/// GET / - available items (payload redacted) grouped with categories.
///
/// Store-preferred; the mirror serves a degraded listing when the store is
/// down.
pub async fn storefront(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Storefront>>> {
    let items: Vec<Item> = match state.items.find_available().await {
        Ok(records) => {
            state.mirror.remember_items(&records);
            records.into_iter().map(Item::from).collect()
        }
        Err(e) => {
            tracing::warn!(error = %e, "store listing failed, serving catalog from mirror (degraded)");
            state
                .mirror
                .items_available()
                .into_iter()
                .map(Item::from)
                .collect()
        }
    };
    let items = items.into_iter().map(Item::redacted).collect();

    let categories = state
        .categories
        .find_all()
        .await
        .map(|records| records.into_iter().map(Category::from).collect())
        .unwrap_or_default();

    Ok(ok(Storefront { items, categories }))
}

// =============================================================================
// Session-scoped views
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Wallet {
    pub user_id: i64,
    pub balance: Decimal,
    pub history: Vec<ChargeHistoryEntry>,
}

/// GET /wallet - balance plus the charge-history statement.
pub async fn wallet(
    State(state): State<ServerState>,
    user: SessionUser,
) -> AppResult<Json<AppResponse<Wallet>>> {
    let balance = state.ledger.get_balance(user.user_id).await?;
    let history = state
        .charge_keys
        .history(user.user_id)
        .await?
        .into_iter()
        .map(ChargeHistoryEntry::from)
        .collect();
    Ok(ok(Wallet {
        user_id: user.user_id,
        balance,
        history,
    }))
}

/// GET /my_purchases - the caller's active (not yet confirmed) orders.
pub async fn my_purchases(
    State(state): State<ServerState>,
    user: SessionUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .orders
        .find_active_by_buyer(user.user_id)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(ok(orders))
}

// =============================================================================
// Purchase
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub buyer_id: i64,
    pub buyer_name: String,
    pub item_id: String,
    /// Sent by the front-end but not authoritative: the item's own delivery
    /// mode governs the path taken.
    #[serde(default)]
    pub delivery_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuyResponse {
    pub status: OrderStatus,
    pub order_id: String,
    pub new_balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_data: Option<String>,
}

/// POST /buy - run the purchase, returning the legacy response shape.
pub async fn buy(
    State(state): State<ServerState>,
    Json(request): Json<BuyRequest>,
) -> AppResult<Json<BuyResponse>> {
    if let Some(requested) = &request.delivery_type {
        tracing::debug!(item_id = %request.item_id, requested, "client-declared delivery type");
    }
    let outcome = BuyAction {
        item_id: request.item_id,
        buyer_id: request.buyer_id,
        buyer_name: request.buyer_name,
    }
    .execute(&state.order_context())
    .await?;

    // Instant purchases reveal the payload in the response as well as the
    // chat message.
    let hidden_data = (outcome.order.status == OrderStatus::Completed)
        .then(|| outcome.order.hidden_payload.clone());

    Ok(Json(BuyResponse {
        status: outcome.order.status,
        order_id: outcome.order.key(),
        new_balance: outcome.new_balance,
        hidden_data,
    }))
}

// =============================================================================
// Balance top-up
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    pub user_id: i64,
    pub charge_key: String,
}

#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<Decimal>,
    pub message: String,
}

/// POST /charge_balance - redeem a charge key. Guard failures come back as
/// `success: false` with a user-facing message, not as HTTP errors.
pub async fn charge_balance(
    State(state): State<ServerState>,
    Json(request): Json<ChargeRequest>,
) -> AppResult<Json<ChargeResponse>> {
    match state
        .charge_keys
        .redeem(&request.charge_key, request.user_id, "")
        .await
    {
        Ok(amount) => {
            let new_balance = state.ledger.get_balance(request.user_id).await?;
            Ok(Json(ChargeResponse {
                success: true,
                new_balance: Some(new_balance),
                message: format!("Credited {amount}"),
            }))
        }
        Err(AppError::NotFound(_)) => Ok(Json(ChargeResponse {
            success: false,
            new_balance: None,
            message: "Unknown charge key".into(),
        })),
        Err(AppError::AlreadyUsed(_)) => Ok(Json(ChargeResponse {
            success: false,
            new_balance: None,
            message: "This key was already used".into(),
        })),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Session establishment
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub user_id: i64,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

/// POST /verify - exchange a bot-issued code for a session cookie.
pub async fn verify(
    State(state): State<ServerState>,
    Json(request): Json<VerifyRequest>,
) -> AppResult<Response> {
    let Some(name) = state.verify_codes.consume(request.user_id, &request.code) else {
        tracing::info!(user_id = request.user_id, "verification code rejected");
        return Ok(Json(VerifyResponse {
            success: false,
            balance: None,
        })
        .into_response());
    };

    let balance = state.ledger.get_balance(request.user_id).await?;
    let token = state.sessions.issue(request.user_id, &name)?;
    let cookie = HeaderValue::from_str(&state.sessions.cookie_value(&token))
        .map_err(|e| AppError::Internal(format!("invalid cookie value: {e}")))?;

    let mut response = Json(VerifyResponse {
        success: true,
        balance: Some(balance),
    })
    .into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}

// =============================================================================
// Legacy session-scoped reads
// =============================================================================

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// GET /get_balance
pub async fn get_balance(
    State(state): State<ServerState>,
    user: SessionUser,
) -> AppResult<Json<BalanceResponse>> {
    let balance = state.ledger.get_balance(user.user_id).await?;
    Ok(Json(BalanceResponse { balance }))
}

/// GET /get_orders
pub async fn get_orders(
    State(state): State<ServerState>,
    user: SessionUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .orders
        .find_active_by_buyer(user.user_id)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(Json(orders))
}
