//! Product endpoints.
//!
//! Recipe (`ingredients`), `addons` and `addonTypes` accept either a JSON
//! array or a string holding one (multipart dashboards send the latter).
//! Every referenced ingredient must belong to the product's store.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use ingreventory_core::validation::{
    parse_addon_types, parse_addons, parse_recipe, validate_amount_cents, validate_name, validate_optional_text,
};
use ingreventory_core::{Product, ValidationError};
use ingreventory_db::generate_id;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route(
            "/products/{id}",
            get(get_product).post(create_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFilter {
    pub store_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
    pub inventory: Option<i64>,
    pub ingredients: Option<Value>,
    pub addon_types: Option<Value>,
    pub addons: Option<Value>,
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> ApiResult<ApiResponse<Vec<Product>>> {
    let products = state.db.products().list(filter.store_id.as_deref()).await?;
    Ok(ApiResponse::list(products))
}

async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ApiResponse<Product>> {
    let product = load_product(&state, &id).await?;
    Ok(ApiResponse::ok(product))
}

/// `POST /products/{storeId}`: the path segment is the owning store.
async fn create_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(store_id): Path<String>,
    ApiJson(body): ApiJson<ProductBody>,
) -> ApiResult<ApiResponse<Product>> {
    ctx.ensure_store(&store_id)?;

    let name = validate_name("name", body.name.as_deref().unwrap_or_default(), 200)?;
    let category_id = body
        .category_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ValidationError::required("category"))?;

    let mut product = Product::new(&store_id, &category_id, &name);
    product.id = generate_id();
    apply_body(&mut product, body)?;
    check_references(&state, &product).await?;

    let product = state.db.products().insert(&product).await?;
    info!(product_id = %product.id, store_id = %store_id, "Product created");

    Ok(ApiResponse::created(product))
}

async fn update_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductBody>,
) -> ApiResult<ApiResponse<Product>> {
    let mut product = load_product(&state, &id).await?;
    ctx.ensure_store(&product.store_id)?;

    if let Some(name) = body.name.as_deref() {
        product.name = validate_name("name", name, 200)?;
    }
    if let Some(category_id) = body.category_id.as_deref() {
        product.category_id = category_id.to_string();
    }
    apply_body(&mut product, body)?;
    check_references(&state, &product).await?;

    let product = state.db.products().update(&product).await?;
    Ok(ApiResponse::ok(product))
}

async fn delete_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let product = load_product(&state, &id).await?;
    ctx.ensure_store(&product.store_id)?;

    state.db.products().delete(&id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(ApiResponse::done("Product deleted successfully"))
}

async fn load_product(state: &AppState, id: &str) -> ApiResult<Product> {
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))
}

/// Copies the optional fields of `body` onto `product`.
fn apply_body(product: &mut Product, body: ProductBody) -> ApiResult<()> {
    if let Some(description) = body.description {
        validate_optional_text("description", Some(&description), 2000)?;
        product.description = description;
    }
    if let Some(cost) = body.cost_cents {
        validate_amount_cents("cost", cost)?;
        product.cost_cents = cost;
    }
    if let Some(price) = body.price_cents {
        validate_amount_cents("price", price)?;
        product.price_cents = price;
    }
    if let Some(image) = body.image {
        product.image = image;
    }
    if let Some(in_stock) = body.in_stock {
        product.in_stock = in_stock;
    }
    if let Some(inventory) = body.inventory {
        product.inventory = inventory;
    }
    if let Some(value) = body.ingredients.as_ref() {
        product.ingredients = parse_recipe(Some(value))?;
    }
    if let Some(value) = body.addon_types.as_ref() {
        product.addon_types = parse_addon_types(Some(value))?;
    }
    if let Some(value) = body.addons.as_ref() {
        product.addons = parse_addons(Some(value))?;
    }
    product.updated_at = Utc::now();
    Ok(())
}

/// The category and every recipe / add-on ingredient must exist in the
/// product's store.
async fn check_references(state: &AppState, product: &Product) -> ApiResult<()> {
    let category = state.db.categories().get_by_id(&product.category_id).await?;
    if category.map(|c| c.store_id) != Some(product.store_id.clone()) {
        return Err(ValidationError::invalid("category", "unknown category for this store").into());
    }

    let mut ids: Vec<String> = product
        .ingredients
        .iter()
        .map(|entry| entry.ingredient_id.clone())
        .chain(product.addons.iter().map(|addon| addon.ingredient_id.clone()))
        .collect();
    ids.sort();
    ids.dedup();

    let found = state.db.ingredients().get_many(&ids).await?;
    for id in &ids {
        match found.get(id) {
            Some(ingredient) if ingredient.store_id == product.store_id => {}
            _ => {
                return Err(ValidationError::invalid("ingredients", format!("unknown ingredient {id}")).into());
            }
        }
    }

    Ok(())
}
