//! # Validation Module
//!
//! Input validation for Ingreventory request bodies.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors (serde)                                      │
//! │  ├── Shape and type of the JSON body                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rules (positive quantities, lengths, ids)                │
//! │  └── Recipe / add-on arrays: JSON array OR JSON string of an array     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / foreign keys                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ingreventory_core::validation::{slugify, validate_quantity};
//!
//! assert_eq!(slugify("  Joe's Coffee & Bakery "), "joes-coffee-bakery");
//! assert!(validate_quantity(0).is_err());
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::{Addon, AddonType, LineItem, NewOrder, RecipeEntry};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MAX_RECIPE_AMOUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-bounded text field and returns it trimmed.
pub fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional, length-bounded text field.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Minimal email shape check and normalisation (trimmed, lowercased).
///
/// ```rust
/// use ingreventory_core::validation::validate_email;
///
/// assert_eq!(validate_email(" Owner@Cafe.COM ").unwrap(), "owner@cafe.com");
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::invalid("email", "must be a valid email address"));
    }

    Ok(email)
}

/// Validates a password for registration and reset.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

/// Derives a URL slug from a display name.
///
/// Lowercases, turns whitespace runs into `-`, strips anything that is not
/// a word character or `-`, collapses repeated dashes and trims dashes from
/// both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
        }
    }

    let mut collapsed = String::with_capacity(slug.len());
    for ch in slug.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    collapsed.trim_matches('-').to_string()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a per-ingredient recipe amount: positive and at most
/// MAX_RECIPE_AMOUNT.
pub fn validate_recipe_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if amount > MAX_RECIPE_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_RECIPE_AMOUNT,
        });
    }

    Ok(())
}

/// Multiplies a recipe count by a line quantity, failing instead of
/// wrapping on overflow.
pub fn scaled_amount(count: i64, quantity: i64) -> ValidationResult<i64> {
    count.checked_mul(quantity).ok_or_else(|| ValidationError::OutOfRange {
        field: "ingredients.count".to_string(),
        min: 1,
        max: i64::MAX / quantity.max(1),
    })
}

/// Validates a non-negative amount in minor units.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cash-flow amount, which must be strictly positive.
pub fn validate_cashflow_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Recipe & Add-on Arrays
// =============================================================================

/// Parses a list field that may arrive either as a JSON array or as a JSON
/// string whose content is an array (multipart form fields).
///
/// `null` or a missing field yields an empty list; any other shape is an
/// error rather than a silent empty list.
pub fn parse_list_field<T: DeserializeOwned>(field: &str, value: Option<&Value>) -> ValidationResult<Vec<T>> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .map_err(|e| ValidationError::invalid(field, format!("not valid JSON: {e}")))?,
        Some(other) => other.clone(),
    };

    if !value.is_array() {
        return Err(ValidationError::invalid(field, "must be an array"));
    }

    serde_json::from_value(value).map_err(|e| ValidationError::invalid(field, e.to_string()))
}

/// Parses and validates a base recipe.
pub fn parse_recipe(value: Option<&Value>) -> ValidationResult<Vec<RecipeEntry>> {
    let entries: Vec<RecipeEntry> = parse_list_field("ingredients", value)?;

    for entry in &entries {
        if entry.ingredient_id.trim().is_empty() {
            return Err(ValidationError::required("ingredients.ingredient"));
        }
        validate_recipe_amount("ingredients.count", entry.count)?;
    }

    Ok(entries)
}

/// Parses and validates an add-on list.
pub fn parse_addons(value: Option<&Value>) -> ValidationResult<Vec<Addon>> {
    let addons: Vec<Addon> = parse_list_field("addons", value)?;

    for addon in &addons {
        if addon.label.trim().is_empty() {
            return Err(ValidationError::required("addons.label"));
        }
        if addon.ingredient_id.trim().is_empty() {
            return Err(ValidationError::required("addons.ingredient"));
        }
        validate_recipe_amount("addons.quantity", addon.quantity)?;
        validate_amount_cents("addons.price", addon.price_cents)?;
        validate_amount_cents("addons.cost", addon.cost_cents)?;
    }

    Ok(addons)
}

/// Parses and validates an add-on type list.
pub fn parse_addon_types(value: Option<&Value>) -> ValidationResult<Vec<AddonType>> {
    let types: Vec<AddonType> = parse_list_field("addonTypes", value)?;

    if types.iter().any(|t| t.label.trim().is_empty()) {
        return Err(ValidationError::required("addonTypes.label"));
    }

    Ok(types)
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a single line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.product_id.trim().is_empty() {
        return Err(ValidationError::required("items.productId"));
    }
    validate_name("items.name", &item.name, 200)?;
    validate_quantity(item.quantity)?;
    validate_amount_cents("items.price", item.price_cents)?;
    validate_amount_cents("items.subtotal", item.subtotal_cents)?;

    if item.addons.iter().any(|addon| addon.label.trim().is_empty()) {
        return Err(ValidationError::required("items.addons.label"));
    }

    Ok(())
}

/// Validates a checkout payload.
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    let customer = &order.customer;
    validate_name("customer.firstName", &customer.first_name, 100)?;
    validate_name("customer.lastName", &customer.last_name, 100)?;
    validate_email(&customer.email)?;
    validate_name("customer.phone", &customer.phone, 50)?;

    let address = &order.shipping_address;
    validate_name("shippingAddress.address", &address.address, 300)?;
    validate_name("shippingAddress.city", &address.city, 100)?;
    validate_name("shippingAddress.state", &address.state, 100)?;
    validate_name("shippingAddress.zipCode", &address.zip_code, 20)?;

    if order.items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    if order.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }
    for item in &order.items {
        validate_line_item(item)?;
    }

    validate_amount_cents("totalCost", order.total_cost_cents)?;
    validate_amount_cents("subtotal", order.subtotal_cents)?;
    validate_amount_cents("shipping", order.shipping_cents)?;
    validate_amount_cents("total", order.total_cents)?;
    if let Some(cash) = order.cash_given_cents {
        validate_amount_cents("cashGiven", cash)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
