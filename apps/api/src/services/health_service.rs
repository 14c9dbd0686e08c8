use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

async fn health(State(state): State<AppState>) -> ApiResponse<Health> {
    let database = state.db.health_check().await;
    ApiResponse::ok(Health {
        status: if database { "ok" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}
