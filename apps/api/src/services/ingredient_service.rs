//! Ingredient endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use ingreventory_core::validation::{validate_amount_cents, validate_name, validate_optional_text};
use ingreventory_core::{Ingredient, ValidationError, DEFAULT_UNIT};
use ingreventory_db::generate_id;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::services::product_service::StoreFilter;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/{id}",
            get(get_ingredient).put(update_ingredient).delete(delete_ingredient),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub stock: Option<i64>,
    pub price_per_unit_cents: Option<i64>,
    pub markup_bps: Option<i64>,
    #[serde(alias = "store")]
    pub store_id: Option<String>,
}

async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> ApiResult<ApiResponse<Vec<Ingredient>>> {
    let store_id = filter
        .store_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("storeId is required".to_string()))?;

    let ingredients = state.db.ingredients().list_by_store(&store_id).await?;
    Ok(ApiResponse::list(ingredients))
}

async fn get_ingredient(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ApiResponse<Ingredient>> {
    let ingredient = load_ingredient(&state, &id).await?;
    Ok(ApiResponse::ok(ingredient))
}

async fn create_ingredient(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiJson(body): ApiJson<IngredientBody>,
) -> ApiResult<ApiResponse<Ingredient>> {
    let store_id = body
        .store_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ValidationError::required("storeId"))?;
    ctx.ensure_store(&store_id)?;

    let now = Utc::now();
    let mut ingredient = Ingredient {
        id: generate_id(),
        store_id: store_id.clone(),
        name: validate_name("name", body.name.as_deref().unwrap_or_default(), 200)?,
        description: None,
        unit: DEFAULT_UNIT.to_string(),
        stock: 0,
        price_per_unit_cents: 0,
        markup_bps: 0,
        created_at: now,
        last_restocked: None,
    };
    apply_body(&mut ingredient, body)?;

    let ingredient = state.db.ingredients().insert(&ingredient).await?;
    info!(ingredient_id = %ingredient.id, store_id = %store_id, stock = ingredient.stock, "Ingredient created");

    Ok(ApiResponse::created(ingredient))
}

/// Partial update. A changed `stock` stamps `last_restocked`.
async fn update_ingredient(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<IngredientBody>,
) -> ApiResult<ApiResponse<Ingredient>> {
    let mut ingredient = load_ingredient(&state, &id).await?;
    ctx.ensure_store(&ingredient.store_id)?;

    if let Some(name) = body.name.as_deref() {
        ingredient.name = validate_name("name", name, 200)?;
    }
    apply_body(&mut ingredient, body)?;

    let ingredient = state.db.ingredients().update(&ingredient).await?;
    Ok(ApiResponse::ok(ingredient))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let ingredient = load_ingredient(&state, &id).await?;
    ctx.ensure_store(&ingredient.store_id)?;

    state.db.ingredients().delete(&id).await?;
    info!(ingredient_id = %id, "Ingredient deleted");
    Ok(ApiResponse::done("Ingredient removed"))
}

async fn load_ingredient(state: &AppState, id: &str) -> ApiResult<Ingredient> {
    state
        .db
        .ingredients()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient"))
}

fn apply_body(ingredient: &mut Ingredient, body: IngredientBody) -> ApiResult<()> {
    if let Some(description) = body.description {
        validate_optional_text("description", Some(&description), 2000)?;
        ingredient.description = Some(description);
    }
    if let Some(unit) = body.unit {
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(ValidationError::required("unit").into());
        }
        ingredient.unit = unit.to_string();
    }
    if let Some(stock) = body.stock {
        ingredient.stock = stock;
    }
    if let Some(price) = body.price_per_unit_cents {
        validate_amount_cents("pricePerUnit", price)?;
        ingredient.price_per_unit_cents = price;
    }
    if let Some(markup) = body.markup_bps {
        if markup < 0 {
            return Err(ValidationError::invalid("markup", "must not be negative").into());
        }
        ingredient.markup_bps = markup;
    }
    Ok(())
}
