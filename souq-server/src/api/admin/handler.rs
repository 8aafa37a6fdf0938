//! Admin API Handlers

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::{Json, http::HeaderName};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{CategoryCreate, CategoryUpdate, ItemCreate};
use crate::orders::{ClaimAction, CompleteAction, OrderAction};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::{Category, ChargeKey, DeliveryMode, Item, Order};

static ADMIN_PASS_HEADER: HeaderName = HeaderName::from_static("x-admin-pass");

/// Password gate for the admin API.
///
/// Compares `x-admin-pass` against `ADMIN_PASS`. An empty configured
/// password locks the whole surface rather than opening it.
#[derive(Debug, Clone, Copy)]
pub struct AdminGate;

impl FromRequestParts<ServerState> for AdminGate {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let configured = state.config.admin_pass.as_str();
        if configured.is_empty() {
            tracing::warn!("admin api request rejected, ADMIN_PASS is unset");
            return Err(AppError::Forbidden("admin api is disabled".into()));
        }
        let presented = parts
            .headers
            .get(&ADMIN_PASS_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != configured {
            return Err(AppError::Forbidden("wrong admin password".into()));
        }
        Ok(AdminGate)
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub available_items: usize,
    pub sold_items: usize,
    pub active_orders: Vec<Order>,
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    _gate: AdminGate,
) -> AppResult<Json<AppResponse<Dashboard>>> {
    let available_items = state.items.find_available().await.map_err(AppError::from)?.len();
    let sold_items = state.items.find_sold().await.map_err(AppError::from)?.len();
    let active_orders = state
        .orders
        .find_active()
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(ok(Dashboard {
        available_items,
        sold_items,
        active_orders,
    }))
}

// =============================================================================
// Items
// =============================================================================

/// GET /api/admin/items - full catalog including sold items and payloads.
pub async fn list_items(
    State(state): State<ServerState>,
    _gate: AdminGate,
) -> AppResult<Json<AppResponse<Vec<Item>>>> {
    let mut items = state.items.find_available().await.map_err(AppError::from)?;
    items.extend(state.items.find_sold().await.map_err(AppError::from)?);
    Ok(ok(items.into_iter().map(Item::from).collect()))
}

/// POST /api/admin/items
pub async fn create_item(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Json(payload): Json<ItemCreate>,
) -> AppResult<Json<AppResponse<Item>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if payload.price < Decimal::ZERO {
        return Err(AppError::Validation("price must be non-negative".into()));
    }
    let default_mode = match state
        .categories
        .find_by_name(&payload.category)
        .await
        .map_err(AppError::from)?
    {
        Some(category) => category.delivery_mode_default,
        None => DeliveryMode::Manual,
    };
    let item = state
        .items
        .create(payload, default_mode)
        .await
        .map_err(AppError::from)?;
    Ok(ok(item.into()))
}

/// DELETE /api/admin/items/{id}
pub async fn delete_item(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    if !state.items.delete(&id).await.map_err(AppError::from)? {
        return Err(AppError::NotFound(format!("item {id}")));
    }
    state.mirror.forget_item(&id);
    Ok(ok_with_message((), "Item deleted"))
}

// =============================================================================
// Categories
// =============================================================================

/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<ServerState>,
    _gate: AdminGate,
) -> AppResult<Json<AppResponse<Vec<Category>>>> {
    let categories = state
        .categories
        .find_all()
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ok(categories))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<AppResponse<Category>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let category = state
        .categories
        .create(payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok(category.into()))
}

/// PUT /api/admin/categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<AppResponse<Category>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let category = state
        .categories
        .update(&id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok(category.into()))
}

/// DELETE /api/admin/categories/{id}
pub async fn delete_category(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    if !state.categories.delete(&id).await.map_err(AppError::from)? {
        return Err(AppError::NotFound(format!("category {id}")));
    }
    Ok(ok_with_message((), "Category deleted"))
}

// =============================================================================
// Wallet credit
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    pub user_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub new_balance: Decimal,
}

/// POST /api/admin/credit
pub async fn credit(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Json(request): Json<CreditRequest>,
) -> AppResult<Json<AppResponse<CreditResponse>>> {
    let new_balance = state
        .ledger
        .credit(request.user_id, &request.name, request.amount)
        .await?;
    Ok(ok(CreditResponse { new_balance }))
}

// =============================================================================
// Charge keys
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub amount: Decimal,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// GET /api/admin/charge_keys
pub async fn list_keys(
    State(state): State<ServerState>,
    _gate: AdminGate,
) -> AppResult<Json<AppResponse<Vec<ChargeKey>>>> {
    let keys = state
        .charge_keys
        .list()
        .await?
        .into_iter()
        .map(ChargeKey::from)
        .collect();
    Ok(ok(keys))
}

/// POST /api/admin/charge_keys
pub async fn mint_keys(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Json(request): Json<MintRequest>,
) -> AppResult<Json<AppResponse<Vec<String>>>> {
    let codes = state
        .charge_keys
        .generate(request.amount, request.count)
        .await?;
    Ok(ok(codes))
}

// =============================================================================
// Orders dashboard actions
// =============================================================================

/// GET /api/admin/orders - all active orders with payloads.
pub async fn list_orders(
    State(state): State<ServerState>,
    _gate: AdminGate,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .orders
        .find_active()
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(ok(orders))
}

#[derive(Debug, Deserialize)]
pub struct OrderActionRequest {
    /// Telegram id of the admin acting through the dashboard
    pub admin_id: i64,
}

/// POST /api/admin/orders/{id}/claim
pub async fn claim_order(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(request): Json<OrderActionRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = ClaimAction {
        order_id: id,
        admin_id: request.admin_id,
    }
    .execute(&state.order_context())
    .await?;
    Ok(ok(order.into()))
}

/// POST /api/admin/orders/{id}/complete
pub async fn complete_order(
    State(state): State<ServerState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(request): Json<OrderActionRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = CompleteAction {
        order_id: id,
        admin_id: request.admin_id,
    }
    .execute(&state.order_context())
    .await?;
    Ok(ok(order.into()))
}
