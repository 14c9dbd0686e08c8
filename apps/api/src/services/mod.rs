//! HTTP route handlers.
//!
//! Each module exposes `routes()`; [`router`] merges them into the API.

pub mod auth_service;
pub mod cart_service;
pub mod cashflow_service;
pub mod category_service;
pub mod health_service;
pub mod ingredient_service;
pub mod integration_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
pub mod store_service;
pub mod user_service;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health_service::routes())
        .merge(auth_service::routes())
        .merge(user_service::routes())
        .merge(store_service::routes())
        .merge(category_service::routes())
        .merge(product_service::routes())
        .merge(ingredient_service::routes())
        .merge(order_service::routes())
        .merge(cart_service::routes())
        .merge(cashflow_service::routes())
        .merge(payment_service::routes())
        .merge(integration_service::routes())
}
