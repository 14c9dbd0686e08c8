//! Pre-checkout ingredient sufficiency check.

use std::collections::HashMap;

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use tracing::debug;

use ingreventory_core::cart::{find_shortfalls, CartLine};
use ingreventory_core::validation::validate_quantity;
use ingreventory_core::{CoreError, Product};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/cart/check-ingredients", post(check_ingredients))
}

#[derive(Debug, Deserialize)]
pub struct CartCheck {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// Each line is compared against current stock on its own. Any shortfall
/// answers 400 with the `insufficientIngredients` list.
async fn check_ingredients(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CartCheck>,
) -> ApiResult<ApiResponse<()>> {
    let mut products: HashMap<String, Product> = HashMap::new();
    for line in &body.items {
        validate_quantity(line.quantity)?;
        if products.contains_key(&line.product_id) {
            continue;
        }
        let product = state
            .db
            .products()
            .get_by_id(&line.product_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", line.product_id)))?;
        products.insert(line.product_id.clone(), product);
    }

    let mut ingredient_ids: Vec<String> = products
        .values()
        .flat_map(|product| product.ingredients.iter().map(|entry| entry.ingredient_id.clone()))
        .collect();
    ingredient_ids.sort();
    ingredient_ids.dedup();
    let ingredients = state.db.ingredients().get_many(&ingredient_ids).await?;

    let lines: Vec<(&Product, i64)> = body
        .items
        .iter()
        .filter_map(|line| products.get(&line.product_id).map(|product| (product, line.quantity)))
        .collect();

    let shortfalls = find_shortfalls(&lines, &ingredients).map_err(|e| match e {
        CoreError::IngredientNotFound(id) => ApiError::NotFound(format!("Ingredient not found: {id}")),
        other => other.into(),
    })?;

    if !shortfalls.is_empty() {
        debug!(lines = lines.len(), shortfalls = shortfalls.len(), "Cart check found shortfalls");
        return Err(ApiError::InsufficientStock(shortfalls));
    }

    Ok(ApiResponse::done("All ingredients have sufficient stock."))
}
