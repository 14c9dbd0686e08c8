//! In-memory store implementation for tests and demos.
//!
//! Every operation takes a single write lock, so decrements are atomic with
//! respect to each other just like the SQL `RETURNING` form.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use ingreventory_core::{Ingredient, Order, OrderStatus, Product};

use crate::error::{StoreError, StoreResult};
use crate::stores::{IngredientStore, OrderStore, ProductStore};

#[derive(Debug, Default)]
pub struct MemoryStores {
    orders: RwLock<HashMap<String, Order>>,
    products: RwLock<HashMap<String, Product>>,
    ingredients: RwLock<HashMap<String, Ingredient>>,
    /// Ingredient ids whose stock operations fail with `Unavailable`.
    unavailable: RwLock<HashSet<String>>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_order(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn put_product(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    pub async fn put_ingredient(&self, ingredient: Ingredient) {
        self.ingredients.write().await.insert(ingredient.id.clone(), ingredient);
    }

    pub async fn remove_product(&self, id: &str) -> Option<Product> {
        self.products.write().await.remove(id)
    }

    pub async fn remove_ingredient(&self, id: &str) -> Option<Ingredient> {
        self.ingredients.write().await.remove(id)
    }

    pub async fn order(&self, id: &str) -> Option<Order> {
        self.orders.read().await.get(id).cloned()
    }

    pub async fn product(&self, id: &str) -> Option<Product> {
        self.products.read().await.get(id).cloned()
    }

    pub async fn stock(&self, ingredient_id: &str) -> Option<i64> {
        self.ingredients.read().await.get(ingredient_id).map(|i| i.stock)
    }

    /// Makes stock operations on `ingredient_id` fail until cleared.
    pub async fn set_unavailable(&self, ingredient_id: &str, unavailable: bool) {
        let mut set = self.unavailable.write().await;
        if unavailable {
            set.insert(ingredient_id.to_string());
        } else {
            set.remove(ingredient_id);
        }
    }

    async fn check_available(&self, ingredient_id: &str) -> StoreResult<()> {
        if self.unavailable.read().await.contains(ingredient_id) {
            return Err(StoreError::Unavailable(format!("ingredient {ingredient_id}")));
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<Option<i64>> {
        self.check_available(id).await?;

        let mut ingredients = self.ingredients.write().await;
        Ok(ingredients.get_mut(id).map(|ingredient| {
            ingredient.stock += delta;
            ingredient.stock
        }))
    }
}

#[async_trait]
impl OrderStore for MemoryStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.order(id).await)
    }

    async fn save(&self, order: &Order) -> StoreResult<Order> {
        self.put_order(order.clone()).await;
        Ok(order.clone())
    }

    async fn claim_shipment(&self, id: &str) -> StoreResult<bool> {
        let mut orders = self.orders.write().await;
        Ok(match orders.get_mut(id) {
            Some(order) if order.status != OrderStatus::Shipped => {
                order.status = OrderStatus::Shipped;
                order.updated_at = Utc::now();
                true
            }
            _ => false,
        })
    }

    async fn release_shipment(&self, id: &str, status: OrderStatus) -> StoreResult<()> {
        if let Some(order) = self.orders.write().await.get_mut(id) {
            if order.status == OrderStatus::Shipped {
                order.status = status;
                order.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.product(id).await)
    }

    async fn update_in_stock_flag(&self, id: &str, in_stock: bool) -> StoreResult<()> {
        if let Some(product) = self.products.write().await.get_mut(id) {
            product.in_stock = in_stock;
        }
        Ok(())
    }
}

#[async_trait]
impl IngredientStore for MemoryStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Ingredient>> {
        Ok(self.ingredients.read().await.get(id).cloned())
    }

    async fn decrement_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>> {
        self.adjust_stock(id, -amount).await
    }

    async fn increment_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>> {
        self.adjust_stock(id, amount).await
    }
}
