//! # Ingreventory API
//!
//! REST server for the storefront and the store dashboard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Services                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ order_service  │  │ catalog        │  │ auth_service / users       ││
//! │  │                │  │                │  │                            ││
//! │  │ • create/list  │  │ • products     │  │ • register / login         ││
//! │  │ • PATCH status │  │ • ingredients  │  │ • forgot / reset password  ││
//! │  │   (deduction)  │  │ • categories   │  │ • user management          ││
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │DeductionEngine │  │ cashflow, cart │  │ integrations               ││
//! │  │ (fulfillment)  │  │ payments,store │  │ Xendit · Facebook · Sender ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Infrastructure: SQLite (ingreventory-db) · JWT auth · tracing    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Common environment variables:
//! - `DATABASE_PATH` - SQLite file (default: `ingreventory.db`)
//! - `PORT` - HTTP port (default: 8000)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `COMPENSATE_ON_FAILURE` - Roll back partial shipments (default: false)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod integrations;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use ingreventory_db::Database;
use ingreventory_fulfillment::{DeductionEngine, DeductionMode};

pub use auth::{AuthContext, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use integrations::Integrations;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: DeductionEngine,
    pub jwt: JwtManager,
    pub integrations: Integrations,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> ApiResult<Self> {
        let mode = DeductionMode::from_compensate_flag(config.fulfillment.compensate_on_failure);
        let engine = DeductionEngine::from_database(db.clone(), mode);
        let jwt = JwtManager::new(config.auth.jwt_secret.clone(), config.auth.token_lifetime_secs);
        let integrations = Integrations::new(&config.integrations)?;

        Ok(AppState {
            db,
            engine,
            jwt,
            integrations,
            config: Arc::new(config),
        })
    }
}

/// Builds the HTTP application with every route mounted under the
/// configured prefix.
pub fn build_router(state: AppState) -> Router {
    error::set_expose_details(state.config.exposes_error_details());

    let prefix = state.config.server.api_prefix.clone();
    let cors = cors_layer(&state.config.server.cors_origins);
    let api = services::router();

    let app = if prefix.is_empty() || prefix == "/" {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
