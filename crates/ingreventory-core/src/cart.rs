//! # Cart Ingredient Check
//!
//! Pre-checkout check that current ingredient stock covers a cart's base
//! recipes. Advisory only: nothing is reserved, the real deduction happens
//! when the order ships.
//!
//! ```text
//! cart: [{ productId, quantity }]
//!        │
//!        ▼  for each base-recipe entry
//! required = count × quantity
//!        │
//!        ├── stock ≥ required → ok
//!        └── stock < required → Shortfall { required, available, product }
//! ```
//! Add-ons are not considered here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Ingredient, Product};
use crate::validation::scaled_amount;

/// One cart line as sent by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// An ingredient whose stock does not cover a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub required: i64,
    pub available: i64,
    /// Name of the product that needs the ingredient.
    pub product: String,
}

/// Lists every base-recipe ingredient whose stock is below what its line
/// needs. Each line is checked on its own; demand is not pooled across
/// lines.
///
/// ## Errors
/// `CoreError::IngredientNotFound` if a recipe names an ingredient missing
/// from `ingredients`.
pub fn find_shortfalls(
    lines: &[(&Product, i64)],
    ingredients: &HashMap<String, Ingredient>,
) -> CoreResult<Vec<Shortfall>> {
    let mut shortfalls = Vec::new();

    for (product, quantity) in lines {
        for entry in &product.ingredients {
            let required = scaled_amount(entry.count, *quantity)?;
            let ingredient = ingredients
                .get(&entry.ingredient_id)
                .ok_or_else(|| CoreError::IngredientNotFound(entry.ingredient_id.clone()))?;

            if ingredient.stock < required {
                shortfalls.push(Shortfall {
                    ingredient_id: ingredient.id.clone(),
                    ingredient_name: ingredient.name.clone(),
                    required,
                    available: ingredient.stock,
                    product: product.name.clone(),
                });
            }
        }
    }

    Ok(shortfalls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipeEntry;
    use chrono::Utc;

    fn ingredient(id: &str, stock: i64) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            store_id: "s".to_string(),
            name: id.to_uppercase(),
            description: None,
            unit: "g".to_string(),
            stock,
            price_per_unit_cents: 0,
            markup_bps: 0,
            created_at: Utc::now(),
            last_restocked: None,
        }
    }

    fn latte() -> Product {
        let mut product = Product::new("s", "c", "Latte");
        product.ingredients = vec![
            RecipeEntry { ingredient_id: "milk".into(), count: 200 },
            RecipeEntry { ingredient_id: "beans".into(), count: 18 },
        ];
        product
    }

    #[test]
    fn test_sufficient_stock_has_no_shortfalls() {
        let stock = HashMap::from([
            ("milk".to_string(), ingredient("milk", 1000)),
            ("beans".to_string(), ingredient("beans", 36)),
        ]);
        let product = latte();
        assert!(find_shortfalls(&[(&product, 2)], &stock).unwrap().is_empty());
    }

    #[test]
    fn test_reports_each_short_ingredient() {
        let stock = HashMap::from([
            ("milk".to_string(), ingredient("milk", 300)),
            ("beans".to_string(), ingredient("beans", 10)),
        ]);
        let product = latte();
        let shortfalls = find_shortfalls(&[(&product, 2)], &stock).unwrap();

        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].required, 400);
        assert_eq!(shortfalls[0].available, 300);
        assert_eq!(shortfalls[1].ingredient_name, "BEANS");
        assert_eq!(shortfalls[1].product, "Latte");
    }

    #[test]
    fn test_missing_ingredient_is_an_error() {
        let stock = HashMap::from([("milk".to_string(), ingredient("milk", 1000))]);
        let product = latte();
        assert!(matches!(
            find_shortfalls(&[(&product, 1)], &stock),
            Err(CoreError::IngredientNotFound(id)) if id == "beans"
        ));
    }

    #[test]
    fn test_overflowing_requirement_is_a_validation_error() {
        let stock = HashMap::from([
            ("milk".to_string(), ingredient("milk", 1000)),
            ("beans".to_string(), ingredient("beans", 36)),
        ]);
        let mut product = latte();
        product.ingredients[0].count = i64::MAX / 2;
        assert!(matches!(
            find_shortfalls(&[(&product, 3)], &stock),
            Err(CoreError::Validation(_))
        ));
    }
}
