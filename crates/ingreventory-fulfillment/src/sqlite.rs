//! SQLite-backed store adapters over [`ingreventory_db::Database`].

use async_trait::async_trait;
use chrono::Utc;

use ingreventory_core::{Ingredient, Order, OrderStatus, Product};
use ingreventory_db::Database;

use crate::error::StoreResult;
use crate::stores::{IngredientStore, OrderStore, ProductStore};

/// Implements every store trait on top of the shared database handle.
#[derive(Debug, Clone)]
pub struct SqliteStores {
    db: Database,
}

impl SqliteStores {
    pub fn new(db: Database) -> Self {
        SqliteStores { db }
    }
}

#[async_trait]
impl OrderStore for SqliteStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.db.orders().get_by_id(id).await?)
    }

    async fn save(&self, order: &Order) -> StoreResult<Order> {
        Ok(self.db.orders().save(order).await?)
    }

    async fn claim_shipment(&self, id: &str) -> StoreResult<bool> {
        Ok(self.db.orders().claim_shipment(id, Utc::now()).await?)
    }

    async fn release_shipment(&self, id: &str, status: OrderStatus) -> StoreResult<()> {
        Ok(self.db.orders().release_shipment(id, status, Utc::now()).await?)
    }
}

#[async_trait]
impl ProductStore for SqliteStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    async fn update_in_stock_flag(&self, id: &str, in_stock: bool) -> StoreResult<()> {
        Ok(self.db.products().set_in_stock(id, in_stock).await?)
    }
}

#[async_trait]
impl IngredientStore for SqliteStores {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Ingredient>> {
        Ok(self.db.ingredients().get_by_id(id).await?)
    }

    async fn decrement_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>> {
        Ok(self.db.ingredients().decrement_stock(id, amount).await?)
    }

    async fn increment_stock(&self, id: &str, amount: i64) -> StoreResult<Option<i64>> {
        Ok(self.db.ingredients().increment_stock(id, amount).await?)
    }
}
