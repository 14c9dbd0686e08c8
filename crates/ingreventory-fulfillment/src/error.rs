//! # Fulfillment Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Planning phase (nothing applied yet)                                   │
//! │    OrderNotFound, ProductNotFound, UnknownAddon, InvalidLine            │
//! │                                                                         │
//! │  Application phase (some decrements may be applied)                     │
//! │    Interrupted { applied, rolled_back, cause }                          │
//! │      cause = IngredientNotFound | Store                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use ingreventory_core::ValidationError;
use ingreventory_db::DbError;

use crate::engine::AppliedDecrement;

/// Failure reported by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// A line item references a product that no longer exists.
    #[error("Order {order_id} line {line} references missing product {product_id}")]
    ProductNotFound {
        order_id: String,
        line: usize,
        product_id: String,
    },

    #[error("Order {order_id} line {line}: product {product_id} has no add-on labelled '{label}'")]
    UnknownAddon {
        order_id: String,
        line: usize,
        product_id: String,
        label: String,
    },

    #[error("Order {order_id} line {line} is invalid: {source}")]
    InvalidLine {
        order_id: String,
        line: usize,
        #[source]
        source: ValidationError,
    },

    /// A recipe or add-on references an ingredient that no longer exists.
    #[error("Order {order_id} line {line} references missing ingredient {ingredient_id}")]
    IngredientNotFound {
        order_id: String,
        line: usize,
        ingredient_id: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failure after deduction started. `applied` lists every decrement
    /// that reached the store; when `rolled_back` is set they have been
    /// reversed again.
    #[error("Deduction for order {order_id} interrupted after {} decrement(s) (rolled back: {rolled_back}): {cause}", .applied.len())]
    Interrupted {
        order_id: String,
        applied: Vec<AppliedDecrement>,
        rolled_back: bool,
        #[source]
        cause: Box<FulfillmentError>,
    },
}

impl FulfillmentError {
    /// The underlying failure, looking through `Interrupted`.
    pub fn root(&self) -> &FulfillmentError {
        match self {
            FulfillmentError::Interrupted { cause, .. } => cause.root(),
            other => other,
        }
    }

    /// Decrements that were applied before the failure.
    pub fn applied(&self) -> &[AppliedDecrement] {
        match self {
            FulfillmentError::Interrupted { applied, .. } => applied,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), FulfillmentError::OrderNotFound(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self.root(), FulfillmentError::InvalidLine { .. })
    }
}

pub type FulfillmentResult<T> = Result<T, FulfillmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_looks_through_interrupted() {
        let err = FulfillmentError::Interrupted {
            order_id: "o1".into(),
            applied: Vec::new(),
            rolled_back: false,
            cause: Box::new(FulfillmentError::IngredientNotFound {
                order_id: "o1".into(),
                line: 0,
                ingredient_id: "i9".into(),
            }),
        };

        assert!(matches!(err.root(), FulfillmentError::IngredientNotFound { .. }));
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("i9"));
    }

    #[test]
    fn test_order_not_found_classification() {
        assert!(FulfillmentError::OrderNotFound("x".into()).is_not_found());
    }
}
