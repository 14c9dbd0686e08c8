//! # ingreventory-fulfillment: Inventory Deduction Engine
//!
//! Turns the order's transition into `shipped` into ingredient stock
//! decrements.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PATCH /api/order/:id/status { "status": "shipped" }                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │           ingreventory-fulfillment (THIS CRATE)                  │  │
//! │  │                                                                  │  │
//! │  │   DeductionEngine ──► recipe::resolve (ingreventory-core)        │  │
//! │  │        │                                                         │  │
//! │  │        ▼                                                         │  │
//! │  │   OrderStore / ProductStore / IngredientStore  (traits)          │  │
//! │  │        │                          │                              │  │
//! │  │        ▼                          ▼                              │  │
//! │  │   SqliteStores               MemoryStores                        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ingreventory-db                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ingreventory_fulfillment::{DeductionEngine, DeductionMode};
//!
//! let engine = DeductionEngine::from_database(db.clone(), DeductionMode::Sequential);
//! let outcome = engine.transition(&order_id, OrderStatus::Shipped).await?;
//! ```

pub mod engine;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod stores;

pub use engine::{AppliedDecrement, DeductionEngine, DeductionMode, TransitionOutcome};
pub use error::{FulfillmentError, FulfillmentResult, StoreError, StoreResult};
pub use memory::MemoryStores;
pub use sqlite::SqliteStores;
pub use stores::{IngredientStore, OrderStore, ProductStore};
