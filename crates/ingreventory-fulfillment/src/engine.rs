//! # Inventory Deduction Engine
//!
//! Drives order status changes. Entering `shipped` consumes the ingredients
//! of every line item.
//!
//! ## Transition Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transition(order_id, target)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load order ───────────── missing ──► OrderNotFound                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  current != shipped && target == shipped ?                              │
//! │       │ no                                  │ yes                       │
//! │       │                                     ▼                           │
//! │       │                 PLAN: load every product, resolve every line    │
//! │       │                       (ProductNotFound / UnknownAddon abort     │
//! │       │                        with zero decrements)                    │
//! │       │                                     │                           │
//! │       │                                     ▼                           │
//! │       │                 CLAIM: status = shipped unless already shipped  │
//! │       │                       (lost claim ──► skip APPLY)               │
//! │       │                                     │                           │
//! │       │                                     ▼                           │
//! │       │                 APPLY: per requirement                          │
//! │       │                       stock = stock - amount  (atomic)          │
//! │       │                       base ingredient ≤ 0 ──► in_stock = false  │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  status = target, updated_at = now, save                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any status may move to any other. There is no terminal state and
//! leaving `shipped` never restores stock. Concurrent requests shipping the
//! same order race on CLAIM, so stock is deducted at most once per entry
//! into `shipped`. A failed APPLY releases the claim.
//!
//! ## Failure During APPLY
//! - [`DeductionMode::Sequential`]: decrements already applied stay applied;
//!   the error lists them for manual reconciliation.
//! - [`DeductionMode::Compensating`]: applied decrements are re-incremented in
//!   reverse order and cleared stock-out flags are restored.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use ingreventory_core::recipe::{self, Requirement, RequirementSource};
use ingreventory_core::{CoreError, Order, OrderStatus, Product, ValidationError};
use ingreventory_db::Database;

use crate::error::{FulfillmentError, FulfillmentResult};
use crate::sqlite::SqliteStores;
use crate::stores::{IngredientStore, OrderStore, ProductStore};

// =============================================================================
// Types
// =============================================================================

/// What happens to applied decrements when deduction fails part way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeductionMode {
    /// Leave applied decrements in place.
    #[default]
    Sequential,
    /// Reverse applied decrements and restore stock-out flags.
    Compensating,
}

impl DeductionMode {
    pub fn from_compensate_flag(compensate_on_failure: bool) -> Self {
        if compensate_on_failure {
            DeductionMode::Compensating
        } else {
            DeductionMode::Sequential
        }
    }
}

/// A stock decrement that reached the ingredient store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecrement {
    /// Index of the line item within the order.
    pub line: usize,
    pub product_id: String,
    pub ingredient_id: String,
    pub amount: i64,
    /// Stock after the decrement.
    pub new_stock: i64,
    pub source: RequirementSource,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub order: Order,
    /// Empty unless this transition entered `shipped`.
    pub deducted: Vec<AppliedDecrement>,
    /// Products whose stock-out flag was cleared by this transition.
    pub stocked_out: Vec<String>,
}

impl TransitionOutcome {
    pub fn deducted_stock(&self) -> bool {
        !self.deducted.is_empty()
    }
}

/// A line item with its product loaded and recipe resolved.
struct PlannedLine {
    line: usize,
    product: Product,
    requirements: Vec<Requirement>,
}

/// Bookkeeping for one APPLY run.
#[derive(Default)]
struct Ledger {
    applied: Vec<AppliedDecrement>,
    /// Products flagged out of stock by this run that were in stock before it.
    cleared_flags: Vec<String>,
}

// =============================================================================
// Engine
// =============================================================================

/// Order state machine with ingredient deduction.
#[derive(Clone)]
pub struct DeductionEngine {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    ingredients: Arc<dyn IngredientStore>,
    mode: DeductionMode,
}

impl DeductionEngine {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        ingredients: Arc<dyn IngredientStore>,
        mode: DeductionMode,
    ) -> Self {
        DeductionEngine {
            orders,
            products,
            ingredients,
            mode,
        }
    }

    /// Engine backed by the SQLite repositories.
    pub fn from_database(db: Database, mode: DeductionMode) -> Self {
        let stores = Arc::new(SqliteStores::new(db));
        DeductionEngine::new(stores.clone(), stores.clone(), stores, mode)
    }

    pub fn mode(&self) -> DeductionMode {
        self.mode
    }

    /// Moves an order to `target`, deducting ingredients when the order
    /// enters `shipped`.
    ///
    /// ## Errors
    /// - `OrderNotFound` if the order does not exist
    /// - `ProductNotFound`, `UnknownAddon`, `InvalidLine` before any stock
    ///   changed; the order keeps its status
    /// - `Interrupted` when a failure occurs after deduction started; the
    ///   order keeps its status
    pub async fn transition(&self, order_id: &str, target: OrderStatus) -> FulfillmentResult<TransitionOutcome> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.to_string()))?;

        let previous = order.status;
        let mut ledger = Ledger::default();
        let mut claimed = false;

        if previous.triggers_deduction(target) {
            let plan = self.plan(&order).await?;
            debug!(order_id = %order.id, lines = plan.len(), "Resolved order recipes");

            claimed = self.orders.claim_shipment(&order.id).await?;
            if !claimed {
                debug!(order_id = %order.id, "Order shipped by a concurrent request, skipping deduction");
            } else if let Err(cause) = self.apply(&order.id, &plan, &mut ledger).await {
                self.release(&order.id, previous).await;
                return Err(self.interrupted(&order.id, ledger, cause).await);
            }
        } else if target == OrderStatus::Shipped {
            debug!(order_id = %order.id, "Order already shipped, skipping deduction");
        }

        order.status = target;
        order.updated_at = Utc::now();

        let saved = match self.orders.save(&order).await {
            Ok(saved) => saved,
            Err(e) if claimed => {
                self.release(&order.id, previous).await;
                return Err(self.interrupted(&order.id, ledger, e.into()).await);
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            order_id = %saved.id,
            from = %previous,
            to = %target,
            decrements = ledger.applied.len(),
            stocked_out = ledger.cleared_flags.len(),
            "Order status changed"
        );

        Ok(TransitionOutcome {
            order: saved,
            deducted: ledger.applied,
            stocked_out: ledger.cleared_flags,
        })
    }

    /// Loads every product and resolves every line before any stock moves.
    async fn plan(&self, order: &Order) -> FulfillmentResult<Vec<PlannedLine>> {
        let mut plan = Vec::with_capacity(order.items.len());

        for (line, item) in order.items.iter().enumerate() {
            let product = self
                .products
                .find_by_id(&item.product_id)
                .await?
                .ok_or_else(|| FulfillmentError::ProductNotFound {
                    order_id: order.id.clone(),
                    line,
                    product_id: item.product_id.clone(),
                })?;

            let requirements =
                recipe::resolve(&product, item.quantity, item.addon_labels().as_slice()).map_err(|e| match e {
                    CoreError::UnknownAddon { product_id, label } => FulfillmentError::UnknownAddon {
                        order_id: order.id.clone(),
                        line,
                        product_id,
                        label,
                    },
                    CoreError::Validation(source) => FulfillmentError::InvalidLine {
                        order_id: order.id.clone(),
                        line,
                        source,
                    },
                    other => FulfillmentError::InvalidLine {
                        order_id: order.id.clone(),
                        line,
                        source: ValidationError::invalid("item", other.to_string()),
                    },
                })?;

            plan.push(PlannedLine {
                line,
                product,
                requirements,
            });
        }

        Ok(plan)
    }

    async fn apply(&self, order_id: &str, plan: &[PlannedLine], ledger: &mut Ledger) -> FulfillmentResult<()> {
        for planned in plan {
            let product = &planned.product;
            let mut flagged = false;

            for requirement in &planned.requirements {
                let new_stock = self
                    .ingredients
                    .decrement_stock(&requirement.ingredient_id, requirement.amount)
                    .await?
                    .ok_or_else(|| FulfillmentError::IngredientNotFound {
                        order_id: order_id.to_string(),
                        line: planned.line,
                        ingredient_id: requirement.ingredient_id.clone(),
                    })?;

                ledger.applied.push(AppliedDecrement {
                    line: planned.line,
                    product_id: product.id.clone(),
                    ingredient_id: requirement.ingredient_id.clone(),
                    amount: requirement.amount,
                    new_stock,
                    source: requirement.source.clone(),
                });

                if requirement.is_base() && new_stock <= 0 && !flagged {
                    self.products.update_in_stock_flag(&product.id, false).await?;
                    flagged = true;
                    if product.in_stock && !ledger.cleared_flags.contains(&product.id) {
                        ledger.cleared_flags.push(product.id.clone());
                    }
                    info!(
                        product_id = %product.id,
                        ingredient_id = %requirement.ingredient_id,
                        new_stock,
                        "Product marked out of stock"
                    );
                }
            }
        }

        Ok(())
    }

    /// Returns a claimed order to `previous`; failures are only logged.
    async fn release(&self, order_id: &str, previous: OrderStatus) {
        if let Err(e) = self.orders.release_shipment(order_id, previous).await {
            warn!(order_id = %order_id, error = %e, "Could not release shipment claim");
        }
    }

    /// Wraps an APPLY-phase failure, compensating first when configured.
    async fn interrupted(&self, order_id: &str, ledger: Ledger, cause: FulfillmentError) -> FulfillmentError {
        warn!(
            order_id = %order_id,
            applied = ledger.applied.len(),
            error = %cause,
            "Deduction interrupted"
        );

        let rolled_back = match self.mode {
            DeductionMode::Sequential => false,
            DeductionMode::Compensating => self.compensate(order_id, &ledger).await,
        };

        FulfillmentError::Interrupted {
            order_id: order_id.to_string(),
            applied: ledger.applied,
            rolled_back,
            cause: Box::new(cause),
        }
    }

    /// Reverses the ledger. Returns `false` if any step could not be undone.
    async fn compensate(&self, order_id: &str, ledger: &Ledger) -> bool {
        let mut complete = true;

        for applied in ledger.applied.iter().rev() {
            match self.ingredients.increment_stock(&applied.ingredient_id, applied.amount).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!(order_id = %order_id, ingredient_id = %applied.ingredient_id, "Ingredient vanished during compensation");
                    complete = false;
                }
                Err(e) => {
                    warn!(order_id = %order_id, ingredient_id = %applied.ingredient_id, error = %e, "Compensation failed");
                    complete = false;
                }
            }
        }

        for product_id in &ledger.cleared_flags {
            if let Err(e) = self.products.update_in_stock_flag(product_id, true).await {
                warn!(order_id = %order_id, product_id = %product_id, error = %e, "Could not restore in_stock flag");
                complete = false;
            }
        }

        info!(order_id = %order_id, reversed = ledger.applied.len(), complete, "Compensated partial deduction");
        complete
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
