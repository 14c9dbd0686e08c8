//! Error types for the HTTP layer.
//!
//! Every handler returns `ApiResult<T>`; domain errors convert with `?` and
//! render as the failure envelope:
//!
//! ```text
//! { "success": false, "message": "...", "error": "..." }
//! ```
//!
//! `error` carries the internal detail and is only present when detail
//! exposure is enabled (see `ApiConfig::exposes_error_details`).

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use ingreventory_core::cart::Shortfall;
use ingreventory_core::{CoreError, ValidationError};
use ingreventory_db::DbError;
use ingreventory_fulfillment::FulfillmentError;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(true);

/// Sets whether failure envelopes carry the `error` detail field.
pub fn set_expose_details(expose: bool) {
    EXPOSE_DETAILS.store(expose, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Cart check found ingredients that cannot cover the cart.
    #[error("Insufficient ingredient stock for one or more items.")]
    InsufficientStock(Vec<Shortfall>),

    #[error("{0} integration is not configured")]
    NotConfigured(&'static str),

    /// A third-party call failed.
    #[error("{service} request failed: {reason}")]
    Upstream { service: &'static str, reason: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Core(CoreError),

    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(validation) => ApiError::Validation(validation),
            other => ApiError::Core(other),
        }
    }
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{entity} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::InsufficientStock(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(e) => match e {
                DbError::NotFound { .. } => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Core(e) => match e {
                CoreError::IngredientNotFound(_) => StatusCode::NOT_FOUND,
                CoreError::UnknownAddon { .. } | CoreError::InvalidStatus(_) | CoreError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
            },
            // References inside committed orders that no longer resolve are
            // data-integrity failures, not client errors.
            ApiError::Fulfillment(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Fulfillment(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Fulfillment(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message. Server errors get a generic one; the detail goes
    /// to the log and, when enabled, the `error` field.
    fn public_message(&self, status: StatusCode) -> String {
        if !status.is_server_error() {
            return self.to_string();
        }
        match self {
            ApiError::Fulfillment(_) => "Failed to update order status".to_string(),
            ApiError::Database(_) => "Database error".to_string(),
            ApiError::Upstream { service, .. } => format!("{service} request failed"),
            ApiError::NotConfigured(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    fn detail(&self) -> Value {
        match self {
            ApiError::Fulfillment(e @ FulfillmentError::Interrupted { rolled_back, .. }) => {
                let applied: Vec<Value> = e
                    .applied()
                    .iter()
                    .map(|d| {
                        json!({
                            "line": d.line,
                            "productId": d.product_id,
                            "ingredientId": d.ingredient_id,
                            "amount": d.amount,
                            "newStock": d.new_stock,
                        })
                    })
                    .collect();
                json!({
                    "reason": e.to_string(),
                    "rolledBack": rolled_back,
                    "applied": applied,
                })
            }
            other => Value::String(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("message".into(), Value::String(self.public_message(status)));

        if let ApiError::InsufficientStock(shortfalls) = &self {
            body.insert(
                "insufficientIngredients".into(),
                serde_json::to_value(shortfalls).unwrap_or(Value::Null),
            );
        }

        if expose_details() && status.is_server_error() {
            body.insert("error".into(), self.detail());
        }

        (status, Json(Value::Object(body))).into_response()
    }
}
