//! # Error Types
//!
//! Domain-specific error types for ingreventory-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ingreventory-core errors (this file)                                  │
//! │  ├── CoreError        - Domain rule failures (unknown add-on, ...)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ingreventory-db errors                                                │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  ingreventory-fulfillment errors                                       │
//! │  └── FulfillmentError - Deduction failures (+ applied decrements)      │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - HTTP status + JSON envelope                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → FulfillmentError → ApiError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ingredient cannot be found.
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    /// A line item selected an add-on label the product does not define.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line: "Burger" + ["Extra Cheese"]
    ///      │
    ///      ▼
    /// Product add-ons: ["Bacon", "Egg"]
    ///      │
    ///      ▼
    /// UnknownAddon { product_id, label: "Extra Cheese" }
    ///      │
    ///      ▼
    /// Order status unchanged, nothing deducted
    /// ```
    #[error("Product {product_id} has no add-on labelled '{label}'")]
    UnknownAddon { product_id: String, label: String },

    /// Status string is not one of the known order statuses.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Malformed value, e.g. a recipe array that does not parse.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownAddon {
            product_id: "p-1".to_string(),
            label: "Extra Cheese".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Product p-1 has no add-on labelled 'Extra Cheese'"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        };
        assert_eq!(err.to_string(), "description must be at most 500 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("quantity").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
