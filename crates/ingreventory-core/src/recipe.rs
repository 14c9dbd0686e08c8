//! # Recipe Resolution
//!
//! Turns one order line (product, quantity, selected add-on labels) into the
//! concrete ingredient amounts it consumes.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line: "Cheeseburger" × 3, add-ons ["Extra Cheese"]                    │
//! │                                                                         │
//! │  Base recipe                      amount = count × quantity             │
//! │    bun    × 1   ──────────────►   bun     3                            │
//! │    patty  × 2   ──────────────►   patty   6                            │
//! │                                                                         │
//! │  Selected add-ons                 amount = add-on quantity (unscaled)   │
//! │    "Extra Cheese" → cheese × 1 ─► cheese  1                            │
//! │                                                                         │
//! │  Unknown label ───────────────►   UnknownAddon error                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Add-on consumption is intentionally not multiplied by the line quantity.
//! The output may name the same ingredient more than once; callers apply
//! each requirement as its own decrement.

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::{scaled_amount, validate_quantity};

/// Where a requirement came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementSource {
    /// Product's base recipe.
    Base,
    /// A selected add-on, by label.
    Addon(String),
}

/// One ingredient amount consumed by an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub ingredient_id: String,
    pub amount: i64,
    pub source: RequirementSource,
}

impl Requirement {
    #[inline]
    pub fn is_base(&self) -> bool {
        self.source == RequirementSource::Base
    }
}

/// Resolves the ingredient requirements of `quantity` units of `product`
/// with the given add-on labels.
///
/// Base entries come first in recipe order, followed by add-ons in the
/// order they were selected.
///
/// ## Errors
/// - `CoreError::Validation` if `quantity` is not a valid line quantity or
///   a scaled amount overflows
/// - `CoreError::UnknownAddon` if a label matches none of the product's add-ons
pub fn resolve<S: AsRef<str>>(product: &Product, quantity: i64, addon_labels: &[S]) -> CoreResult<Vec<Requirement>> {
    validate_quantity(quantity)?;

    let mut requirements = Vec::with_capacity(product.ingredients.len() + addon_labels.len());

    for entry in &product.ingredients {
        requirements.push(Requirement {
            ingredient_id: entry.ingredient_id.clone(),
            amount: scaled_amount(entry.count, quantity)?,
            source: RequirementSource::Base,
        });
    }

    for label in addon_labels {
        let label = label.as_ref();
        let addon = product.find_addon(label).ok_or_else(|| CoreError::UnknownAddon {
            product_id: product.id.clone(),
            label: label.to_string(),
        })?;

        requirements.push(Requirement {
            ingredient_id: addon.ingredient_id.clone(),
            amount: addon.quantity,
            source: RequirementSource::Addon(addon.label.clone()),
        });
    }

    Ok(requirements)
}

// =============================================================================
// Unit Tests
// =============================================================================
