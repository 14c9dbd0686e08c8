//! # Store Traits
//!
//! The engine only sees storage through these traits. The SQLite adapter
//! lives in [`crate::sqlite`], an in-memory one in [`crate::memory`].

use async_trait::async_trait;

use ingreventory_core::{Ingredient, Order, OrderStatus, Product};

use crate::error::StoreResult;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>>;

    async fn save(&self, order: &Order) -> StoreResult<Order>;

    /// Atomically moves the order into `shipped` unless it already is.
    /// Only the caller that gets `true` may deduct stock for it.
    async fn claim_shipment(&self, id: &str) -> StoreResult<bool>;

    /// Undoes a claim, putting the order back to `status`.
    async fn release_shipment(&self, id: &str, status: OrderStatus) -> StoreResult<()>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads a product with its recipe and add-ons populated.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    async fn update_in_stock_flag(&self, id: &str, in_stock: bool) -> StoreResult<()>;
}

#[async_trait]
pub trait IngredientStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Ingredient>>;

    /// Atomically subtracts `amount`; returns the new stock or `None` when
    /// the ingredient does not exist.
    async fn decrement_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>>;

    /// Atomically adds `amount` back. Used by compensation.
    async fn increment_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>>;
}
