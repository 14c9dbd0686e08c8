//! # Product Repository
//!
//! Catalog entries with their recipe and add-on tables.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │  ├── scalar columns (name, price_cents, in_stock, inventory, ...)      │
//! │  ├── ingredients_json   [{"ingredientId":"…","count":2}, …]            │
//! │  ├── addon_types_json   [{"label":"Toppings"}, …]                      │
//! │  └── addons_json        [{"type":"Toppings","label":"Extra Cheese",    │
//! │                           "ingredientId":"…","quantity":1, …}, …]       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The recipe is always loaded with the product, so a single `get_by_id`
//! gives fulfillment everything it needs to resolve a line item.
//!
//! ## Two Stock Signals
//! - `in_stock`: cleared by fulfillment when a base ingredient runs out
//! - `inventory`: legacy unit counter, decremented best-effort at checkout

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::{Addon, AddonType, Product, RecipeEntry};

const PRODUCT_COLUMNS: &str = r#"
    id, store_id, category_id, name, description, cost_cents, price_cents,
    image, in_stock, ingredients_json, addon_types_json, addons_json,
    inventory, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    store_id: String,
    category_id: String,
    name: String,
    description: String,
    cost_cents: i64,
    price_cents: i64,
    image: String,
    in_stock: bool,
    ingredients_json: String,
    addon_types_json: String,
    addons_json: String,
    inventory: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let ingredients: Vec<RecipeEntry> =
            serde_json::from_str(&row.ingredients_json).map_err(|e| DbError::corrupt("Product", &row.id, e))?;
        let addon_types: Vec<AddonType> =
            serde_json::from_str(&row.addon_types_json).map_err(|e| DbError::corrupt("Product", &row.id, e))?;
        let addons: Vec<Addon> =
            serde_json::from_str(&row.addons_json).map_err(|e| DbError::corrupt("Product", &row.id, e))?;

        Ok(Product {
            id: row.id,
            store_id: row.store_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            cost_cents: row.cost_cents,
            price_cents: row.price_cents,
            image: row.image,
            in_stock: row.in_stock,
            ingredients,
            addon_types,
            addons,
            inventory: row.inventory,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

struct EncodedLists {
    ingredients: String,
    addon_types: String,
    addons: String,
}

fn encode_lists(product: &Product) -> DbResult<EncodedLists> {
    let encode = |result: serde_json::Result<String>| result.map_err(|e| DbError::Internal(e.to_string()));
    Ok(EncodedLists {
        ingredients: encode(serde_json::to_string(&product.ingredients))?,
        addon_types: encode(serde_json::to_string(&product.addon_types))?,
        addons: encode(serde_json::to_string(&product.addons))?,
    })
}

fn rows_to_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, newest first, optionally for one store.
    pub async fn list(&self, store_id: Option<&str>) -> DbResult<Vec<Product>> {
        let rows = match store_id {
            Some(store_id) => {
                let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = ?1 ORDER BY created_at DESC");
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(store_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
                sqlx::query_as::<_, ProductRow>(&sql).fetch_all(&self.pool).await?
            }
        };

        debug!(count = rows.len(), "Listed products");
        rows_to_products(rows)
    }

    /// Gets a product with its recipe and add-ons.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a product (id generated beforehand).
    ///
    /// ## Errors
    /// `DbError::ForeignKeyViolation` for an unknown store or category.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let lists = encode_lists(product)?;
        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, category_id, name, description, cost_cents, price_cents,
                image, in_stock, ingredients_json, addon_types_json, addons_json,
                inventory, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(product.in_stock)
        .bind(&lists.ingredients)
        .bind(&lists.addon_types)
        .bind(&lists.addons)
        .bind(product.inventory)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Writes every mutable column of `product` and bumps `updated_at`.
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();
        let lists = encode_lists(product)?;
        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2, name = ?3, description = ?4, cost_cents = ?5,
                price_cents = ?6, image = ?7, in_stock = ?8, ingredients_json = ?9,
                addon_types_json = ?10, addons_json = ?11, inventory = ?12, updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(product.in_stock)
        .bind(&lists.ingredients)
        .bind(&lists.addon_types)
        .bind(&lists.addons)
        .bind(product.inventory)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        let mut updated = product.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Sets the stock-out flag.
    pub async fn set_in_stock(&self, id: &str, in_stock: bool) -> DbResult<()> {
        debug!(id = %id, in_stock, "Setting product in_stock flag");

        let result = sqlx::query("UPDATE products SET in_stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(in_stock)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Decrements the legacy `inventory` counter and returns the new value,
    /// or `None` if the product does not exist.
    pub async fn decrement_inventory(&self, id: &str, quantity: i64) -> DbResult<Option<i64>> {
        debug!(id = %id, quantity, "Decrementing product inventory counter");

        let remaining = sqlx::query_scalar::<_, i64>(
            "UPDATE products SET inventory = inventory - ?2 WHERE id = ?1 RETURNING inventory",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(remaining)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, sample_category, sample_product, sample_store};

    #[tokio::test]
    async fn test_recipe_and_addons_round_trip() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Burger Bar")).await.unwrap();
        let category = db.categories().insert(&sample_category(&store.id, "Mains")).await.unwrap();

        let mut product = sample_product(&store.id, &category.id, "Cheeseburger");
        product.ingredients = vec![RecipeEntry {
            ingredient_id: "patty".into(),
            count: 2,
        }];
        product.addon_types = vec![AddonType { label: "Toppings".into() }];
        product.addons = vec![Addon {
            addon_type: "Toppings".into(),
            label: "Extra Cheese".into(),
            ingredient_id: "cheese".into(),
            quantity: 1,
            cost_cents: 20,
            price_cents: 150,
        }];
        db.products().insert(&product).await.unwrap();

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.ingredients, product.ingredients);
        assert_eq!(loaded.addon_types, product.addon_types);
        assert_eq!(loaded.addons, product.addons);
        assert!(loaded.in_stock);
    }

    #[tokio::test]
    async fn test_in_stock_flag_and_inventory_counter() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Flags")).await.unwrap();
        let category = db.categories().insert(&sample_category(&store.id, "All")).await.unwrap();
        let mut product = sample_product(&store.id, &category.id, "Muffin");
        product.inventory = 5;
        db.products().insert(&product).await.unwrap();

        db.products().set_in_stock(&product.id, false).await.unwrap();
        assert!(!db.products().get_by_id(&product.id).await.unwrap().unwrap().in_stock);

        assert_eq!(db.products().decrement_inventory(&product.id, 7).await.unwrap(), Some(-2));
        assert_eq!(db.products().decrement_inventory("missing", 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("FK")).await.unwrap();
        let err = db
            .products()
            .insert(&sample_product(&store.id, "no-such-category", "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_json_column_is_reported() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Corrupt")).await.unwrap();
        let category = db.categories().insert(&sample_category(&store.id, "X")).await.unwrap();
        let product = sample_product(&store.id, &category.id, "Broken");
        db.products().insert(&product).await.unwrap();

        sqlx::query("UPDATE products SET addons_json = 'not json' WHERE id = ?1")
            .bind(&product.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.products().get_by_id(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRow { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_store() {
        let db = memory_db().await;
        let a = db.stores().insert(&sample_store("A")).await.unwrap();
        let b = db.stores().insert(&sample_store("B")).await.unwrap();
        let ca = db.categories().insert(&sample_category(&a.id, "C")).await.unwrap();
        let cb = db.categories().insert(&sample_category(&b.id, "C")).await.unwrap();
        db.products().insert(&sample_product(&a.id, &ca.id, "One")).await.unwrap();
        db.products().insert(&sample_product(&b.id, &cb.id, "Two")).await.unwrap();

        assert_eq!(db.products().list(Some(&a.id)).await.unwrap().len(), 1);
        assert_eq!(db.products().list(None).await.unwrap().len(), 2);
        assert_eq!(db.products().count().await.unwrap(), 2);
    }
}
