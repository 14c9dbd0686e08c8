//! Payment invoices and conversion events.

use axum::{extract::State, routing::post, Router};
use serde_json::Value;
use tracing::info;

use ingreventory_core::ValidationError;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::integrations::facebook::{CustomEvent, PurchaseEvent};
use crate::integrations::xendit::{Invoice, InvoiceRequest};
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/xendit/create-invoice", post(create_invoice))
        .route("/facebook/purchase", post(send_purchase))
        .route("/facebook/anyevent", post(send_any_event))
}

async fn create_invoice(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<InvoiceRequest>,
) -> ApiResult<ApiResponse<Invoice>> {
    if body.order_id.trim().is_empty() {
        return Err(ValidationError::required("orderId").into());
    }
    if body.amount_cents <= 0 {
        return Err(ValidationError::invalid("amount", "must be positive").into());
    }
    if body.customer.email.trim().is_empty() {
        return Err(ValidationError::required("customer.email").into());
    }

    let invoice = state.integrations.xendit.create_invoice(&body).await?;
    info!(order_id = %body.order_id, amount = body.amount_cents, "Invoice created");
    Ok(ApiResponse::ok(invoice))
}

async fn send_purchase(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PurchaseEvent>,
) -> ApiResult<ApiResponse<Value>> {
    let response = state.integrations.facebook.send_purchase(&body).await?;
    Ok(ApiResponse::ok(response))
}

async fn send_any_event(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CustomEvent>,
) -> ApiResult<ApiResponse<Value>> {
    if body.event_name.trim().is_empty() {
        return Err(ValidationError::required("event_name").into());
    }

    let response = state.integrations.facebook.send_event(&body).await?;
    Ok(ApiResponse::ok(response))
}
