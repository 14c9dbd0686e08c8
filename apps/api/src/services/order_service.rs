//! Order endpoints.
//!
//! ```text
//! POST  /order                 create (pending) + best-effort inventory counter
//! GET   /orders                all orders (newest first)
//! GET   /order/{id}            one order
//! GET   /orders/user/{userId}  orders of a user
//! GET   /user/{userId}         orders of a user
//! GET   /store/{storeId}       orders of a store
//! PATCH /order/{id}/status     state machine; entering `shipped` deducts stock
//! PATCH /orders/{id}           field patch, never deducts
//! ```

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use ingreventory_core::validation::validate_new_order;
use ingreventory_core::{NewOrder, Order, OrderPatch, OrderStatus};
use ingreventory_db::generate_id;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(create_order))
        .route("/orders", get(list_orders))
        .route("/order/{id}", get(get_order))
        .route("/orders/user/{user_id}", get(list_user_orders))
        .route("/user/{user_id}", get(list_user_orders))
        .route("/store/{store_id}", get(list_store_orders))
        .route("/order/{id}/status", patch(update_order_status))
        .route("/orders/{id}", patch(patch_order))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// Stores a new order and decrements each product's legacy inventory
/// counter. Counter failures are logged and never fail the request.
async fn create_order(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewOrder>,
) -> ApiResult<ApiResponse<Order>> {
    validate_new_order(&body)?;

    let order = body.into_order(generate_id(), Utc::now());
    let order = state.db.orders().insert(&order).await?;
    info!(order_id = %order.id, items = order.items.len(), total = order.total_cents, "Order created");

    let products = state.db.products();
    for item in &order.items {
        match products.decrement_inventory(&item.product_id, item.quantity).await {
            Ok(Some(remaining)) => {
                debug!(product_id = %item.product_id, remaining, "Inventory counter decremented")
            }
            Ok(None) => debug!(product_id = %item.product_id, "Inventory counter skipped, product missing"),
            Err(e) => warn!(product_id = %item.product_id, error = %e, "Inventory counter decrement failed"),
        }
    }

    Ok(ApiResponse::created(order).message("Order created successfully"))
}

/// Staff see their own store's orders; staff without a store see all.
async fn list_orders(State(state): State<AppState>, ctx: AuthContext) -> ApiResult<ApiResponse<Vec<Order>>> {
    ctx.require_staff()?;

    let orders = match ctx.store_id.as_deref() {
        Some(store_id) => state.db.orders().list_by_store(store_id).await?,
        None => state.db.orders().list_all().await?,
    };
    Ok(ApiResponse::list(orders))
}

async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ApiResponse<Order>> {
    let order = load_order(&state, &id).await?;
    Ok(ApiResponse::ok(order))
}

async fn list_user_orders(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Order>>> {
    ctx.ensure_self_or_staff(&user_id)?;

    let orders = state.db.orders().list_by_user(&user_id).await?;
    Ok(ApiResponse::list(orders))
}

async fn list_store_orders(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(store_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Order>>> {
    ctx.ensure_store(&store_id)?;

    let orders = state.db.orders().list_by_store(&store_id).await?;
    Ok(ApiResponse::list(orders))
}

async fn update_order_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusChange>,
) -> ApiResult<ApiResponse<Order>> {
    let current = load_order(&state, &id).await?;
    authorize_order(&ctx, &current)?;

    let outcome = state.engine.transition(&id, body.status).await?;

    let message = if outcome.deducted_stock() {
        format!(
            "Order status updated successfully ({} ingredient deduction(s), {} product(s) out of stock)",
            outcome.deducted.len(),
            outcome.stocked_out.len()
        )
    } else {
        "Order status updated successfully".to_string()
    };

    Ok(ApiResponse::ok(outcome.order).message(message))
}

async fn patch_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<OrderPatch>,
) -> ApiResult<ApiResponse<Order>> {
    let mut order = load_order(&state, &id).await?;
    authorize_order(&ctx, &order)?;

    if let Some(status) = patch.status {
        if order.status.triggers_deduction(status) {
            warn!(order_id = %id, "Order patched into shipped without ingredient deduction");
        }
    }

    patch.apply(&mut order, Utc::now());
    let order = state.db.orders().save(&order).await?;
    Ok(ApiResponse::ok(order))
}

async fn load_order(state: &AppState, id: &str) -> ApiResult<Order> {
    state
        .db
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order"))
}

fn authorize_order(ctx: &AuthContext, order: &Order) -> ApiResult<()> {
    match order.store_id.as_deref() {
        Some(store_id) => ctx.ensure_store(store_id),
        None => ctx.require_staff(),
    }
}
