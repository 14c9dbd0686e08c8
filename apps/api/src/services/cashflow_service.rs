//! Manual cash ledger and the sales summary.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use ingreventory_core::cashflow::{default_window, SalesSummary};
use ingreventory_core::validation::{validate_cashflow_amount, validate_optional_text};
use ingreventory_core::{Cashflow, CashflowType, Order, ValidationError};
use ingreventory_db::generate_id;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashflow", post(add_cashflow))
        .route("/cashflow/summary", get(sales_summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCashflow {
    #[serde(rename = "type")]
    pub flow_type: CashflowType,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub user_id: Option<String>,
    pub store_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub store_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub orders: Vec<Order>,
    pub cashflows: Vec<Cashflow>,
    pub summary: SalesSummary,
}

async fn add_cashflow(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiJson(body): ApiJson<NewCashflow>,
) -> ApiResult<ApiResponse<Cashflow>> {
    if body.store_id.trim().is_empty() {
        return Err(ValidationError::required("storeId").into());
    }
    ctx.ensure_store(&body.store_id)?;
    validate_cashflow_amount(body.amount_cents)?;
    validate_optional_text("note", body.note.as_deref(), 500)?;

    let entry = Cashflow {
        id: generate_id(),
        flow_type: body.flow_type,
        amount_cents: body.amount_cents,
        note: body.note,
        user_id: body.user_id.or_else(|| Some(ctx.user_id.clone())),
        store_id: body.store_id,
        created_at: Utc::now(),
    };

    let entry = state.db.cashflows().insert(&entry).await?;
    info!(
        cashflow_id = %entry.id,
        store_id = %entry.store_id,
        flow_type = ?entry.flow_type,
        amount = entry.amount_cents,
        "Cash flow recorded"
    );
    Ok(ApiResponse::created(entry))
}

/// Orders and cash entries of a store within `[start, end]`, defaulting to
/// midnight UTC today until now.
async fn sales_summary(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<ApiResponse<SummaryReport>> {
    let store_id = query
        .store_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("storeId is required".to_string()))?;
    ctx.ensure_store(&store_id)?;

    let (default_start, default_end) = default_window(Utc::now());
    let start = query.start.unwrap_or(default_start);
    let end = query.end.unwrap_or(default_end);
    if start > end {
        return Err(ValidationError::invalid("start", "must not be after end").into());
    }

    let orders = state.db.orders().list_by_store_between(&store_id, start, end).await?;
    let cashflows = state.db.cashflows().list_by_store_between(&store_id, start, end).await?;
    let summary = SalesSummary::compute(&orders, &cashflows);

    Ok(ApiResponse::ok(SummaryReport {
        orders,
        cashflows,
        summary,
    }))
}
