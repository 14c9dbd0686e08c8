//! # ingreventory-core: Pure Business Logic for Ingreventory
//!
//! This crate holds the domain model and every rule that can be expressed
//! without touching a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ingreventory Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /order  /products  /ingredients  /cashflow  /auth ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ingreventory-fulfillment                           │   │
//! │  │    DeductionEngine (status transition → stock decrements)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ ingreventory-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  types  │ │  money  │ │ recipe  │ │  cart   │ │ cashflow │ │   │
//! │  │   │ Order   │ │  Money  │ │ resolve │ │shortfall│ │ summary  │ │   │
//! │  │   │ Product │ │         │ │         │ │         │ │          │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ingreventory-db (SQLite)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Product, Ingredient, Store, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and boundary parsing of recipe/add-on arrays
//! - [`recipe`] - Recipe resolution: product + add-ons → ingredient amounts
//! - [`cart`] - Pre-checkout ingredient sufficiency check
//! - [`cashflow`] - Cash-flow summary arithmetic
//!
//! ## Example Usage
//!
//! ```rust
//! use ingreventory_core::recipe::resolve;
//! use ingreventory_core::types::{Product, RecipeEntry};
//!
//! let mut product = Product::new("store-1", "cat-1", "Latte");
//! product.ingredients.push(RecipeEntry { ingredient_id: "milk".into(), count: 2 });
//!
//! let requirements = resolve::<&str>(&product, 3, &[]).unwrap();
//! assert_eq!(requirements[0].amount, 6);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cashflow;
pub mod error;
pub mod money;
pub mod recipe;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Guards against accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum recipe `count` or add-on `quantity` of one ingredient.
pub const MAX_RECIPE_AMOUNT: i64 = 1_000_000;

/// Maximum number of line items in a single order.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Default unit of measure for ingredients.
pub const DEFAULT_UNIT: &str = "g";

/// Default store currency.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";
pub const DEFAULT_CURRENCY_CODE: &str = "USD";
