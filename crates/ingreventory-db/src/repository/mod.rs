//! # Repository Module
//!
//! One repository per aggregate, each a thin handle over the shared pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler / DeductionEngine                                         │
//! │       │   db.ingredients().decrement_stock(id, 6)                       │
//! │       ▼                                                                 │
//! │  IngredientRepository ──► UPDATE ... SET stock = stock - ?1 RETURNING   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read with `query_as::<_, XxxRow>` and converted into the
//! `ingreventory-core` types; JSON columns are decoded there.
//!
//! ## Available Repositories
//!
//! - [`StoreRepository`] - Tenants
//! - [`UserRepository`] - Accounts, credentials, reset codes
//! - [`CategoryRepository`] - Categories with product counts
//! - [`ProductRepository`] - Catalog, recipes, add-ons, stock-out flag
//! - [`IngredientRepository`] - Stock and atomic decrements
//! - [`OrderRepository`] - Orders and their line items
//! - [`CashflowRepository`] - Till in/out entries
//! - [`PaymentSettingRepository`] - Per-store payment configuration

pub mod cashflow;
pub mod category;
pub mod ingredient;
pub mod order;
pub mod payment;
pub mod product;
pub mod store;
pub mod user;

pub use cashflow::CashflowRepository;
pub use category::CategoryRepository;
pub use ingredient::IngredientRepository;
pub use order::OrderRepository;
pub use payment::PaymentSettingRepository;
pub use product::ProductRepository;
pub use store::StoreRepository;
pub use user::{UserCredentials, UserRepository};

use uuid::Uuid;

/// Generates a new entity id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
