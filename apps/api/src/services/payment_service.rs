//! Per-store payment settings.

use axum::{extract::State, routing::get, Router};
use serde::Deserialize;
use tracing::info;

use ingreventory_core::{CustomPaymentMethod, PaymentOption, PaymentSetting};

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::services::product_service::StoreFilter;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/payments", get(get_settings).post(save_settings))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettings {
    pub store_id: Option<String>,
    #[serde(default)]
    pub options: Vec<PaymentOption>,
    #[serde(default)]
    pub custom_methods: Vec<CustomPaymentMethod>,
}

/// Returns the store's settings, creating empty ones on first read.
async fn get_settings(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> ApiResult<ApiResponse<PaymentSetting>> {
    let store_id = required_store(filter.store_id)?;
    let setting = state.db.payment_settings().get_or_create(&store_id).await?;
    Ok(ApiResponse::ok(setting))
}

async fn save_settings(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiJson(body): ApiJson<SaveSettings>,
) -> ApiResult<ApiResponse<PaymentSetting>> {
    let store_id = required_store(body.store_id)?;
    ctx.ensure_store(&store_id)?;

    let setting = state
        .db
        .payment_settings()
        .upsert(&store_id, &body.options, &body.custom_methods)
        .await?;
    info!(
        store_id = %store_id,
        options = setting.options.len(),
        custom = setting.custom_methods.len(),
        "Payment settings saved"
    );
    Ok(ApiResponse::ok(setting))
}

fn required_store(store_id: Option<String>) -> ApiResult<String> {
    store_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("storeId is required".to_string()))
}
