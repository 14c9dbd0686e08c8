//! # Ingredient Repository
//!
//! Stock of raw materials.
//!
//! ## Atomic Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ read-modify-write (lost update under concurrency)                   │
//! │     stock = SELECT stock …;  UPDATE … SET stock = {stock - 6}           │
//! │                                                                         │
//! │  ✅ single statement, new value read back                               │
//! │     UPDATE ingredients SET stock = stock - ?2 WHERE id = ?1             │
//! │     RETURNING stock                                                     │
//! │                                                                         │
//! │  stock 10, two orders × 6  ──►  10 - 6 - 6 = -2 (no update lost)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Stock is allowed to go negative.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::Ingredient;

const INGREDIENT_COLUMNS: &str = r#"
    id, store_id, name, description, unit, stock, price_per_unit_cents,
    markup_bps, created_at, last_restocked
"#;

#[derive(Debug, FromRow)]
struct IngredientRow {
    id: String,
    store_id: String,
    name: String,
    description: Option<String>,
    unit: String,
    stock: i64,
    price_per_unit_cents: i64,
    markup_bps: i64,
    created_at: DateTime<Utc>,
    last_restocked: Option<DateTime<Utc>>,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            description: row.description,
            unit: row.unit,
            stock: row.stock,
            price_per_unit_cents: row.price_per_unit_cents,
            markup_bps: row.markup_bps,
            created_at: row.created_at,
            last_restocked: row.last_restocked,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Ingredients of a store ordered by name.
    pub async fn list_by_store(&self, store_id: &str) -> DbResult<Vec<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE store_id = ?1 ORDER BY name");
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
        let row = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Ingredient::from))
    }

    /// Loads several ingredients at once, keyed by id. Unknown ids are
    /// simply absent from the map.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<HashMap<String, Ingredient>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder.build_query_as::<IngredientRow>().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id.clone(), Ingredient::from(row)))
            .collect())
    }

    pub async fn insert(&self, ingredient: &Ingredient) -> DbResult<Ingredient> {
        debug!(id = %ingredient.id, name = %ingredient.name, "Inserting ingredient");

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, store_id, name, description, unit, stock, price_per_unit_cents,
                markup_bps, created_at, last_restocked
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.store_id)
        .bind(&ingredient.name)
        .bind(&ingredient.description)
        .bind(&ingredient.unit)
        .bind(ingredient.stock)
        .bind(ingredient.price_per_unit_cents)
        .bind(ingredient.markup_bps)
        .bind(ingredient.created_at)
        .bind(ingredient.last_restocked)
        .execute(&self.pool)
        .await?;

        Ok(ingredient.clone())
    }

    /// Writes the editable columns. When `stock` differs from the stored
    /// value, `last_restocked` is stamped with the current time.
    pub async fn update(&self, ingredient: &Ingredient) -> DbResult<Ingredient> {
        debug!(id = %ingredient.id, "Updating ingredient");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE ingredients SET
                name = ?2, description = ?3, unit = ?4, price_per_unit_cents = ?5,
                markup_bps = ?6,
                last_restocked = CASE WHEN stock != ?7 THEN ?8 ELSE last_restocked END,
                stock = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.description)
        .bind(&ingredient.unit)
        .bind(ingredient.price_per_unit_cents)
        .bind(ingredient.markup_bps)
        .bind(ingredient.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", &ingredient.id));
        }

        self.get_by_id(&ingredient.id)
            .await?
            .ok_or_else(|| DbError::not_found("Ingredient", &ingredient.id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting ingredient");

        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", id));
        }
        Ok(())
    }

    /// Atomically subtracts `amount` and returns the new stock, or `None`
    /// if the ingredient does not exist.
    pub async fn decrement_stock(&self, id: &str, amount: i64) -> DbResult<Option<i64>> {
        let new_stock = sqlx::query_scalar::<_, i64>(
            "UPDATE ingredients SET stock = stock - ?2 WHERE id = ?1 RETURNING stock",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        debug!(id = %id, amount, new_stock = ?new_stock, "Decremented ingredient stock");
        Ok(new_stock)
    }

    /// Atomically adds `amount` back and returns the new stock, or `None`
    /// if the ingredient does not exist.
    pub async fn increment_stock(&self, id: &str, amount: i64) -> DbResult<Option<i64>> {
        let new_stock = sqlx::query_scalar::<_, i64>(
            "UPDATE ingredients SET stock = stock + ?2 WHERE id = ?1 RETURNING stock",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        debug!(id = %id, amount, new_stock = ?new_stock, "Incremented ingredient stock");
        Ok(new_stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, sample_ingredient, sample_store};

    #[tokio::test]
    async fn test_decrement_returns_new_stock_and_allows_negative() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Stock")).await.unwrap();
        let flour = db.ingredients().insert(&sample_ingredient(&store.id, "Flour", 10)).await.unwrap();

        assert_eq!(db.ingredients().decrement_stock(&flour.id, 6).await.unwrap(), Some(4));
        assert_eq!(db.ingredients().decrement_stock(&flour.id, 6).await.unwrap(), Some(-2));
        assert_eq!(db.ingredients().increment_stock(&flour.id, 2).await.unwrap(), Some(0));
        assert_eq!(db.ingredients().decrement_stock("missing", 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stock_edit_stamps_last_restocked() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Restock")).await.unwrap();
        let mut sugar = db.ingredients().insert(&sample_ingredient(&store.id, "Sugar", 5)).await.unwrap();
        assert!(sugar.last_restocked.is_none());

        sugar.description = Some("white".into());
        let renamed = db.ingredients().update(&sugar).await.unwrap();
        assert!(renamed.last_restocked.is_none());

        sugar.stock = 500;
        let restocked = db.ingredients().update(&sugar).await.unwrap();
        assert_eq!(restocked.stock, 500);
        assert!(restocked.last_restocked.is_some());
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_get_many() {
        let db = memory_db().await;
        let store = db.stores().insert(&sample_store("Names")).await.unwrap();
        let milk = db.ingredients().insert(&sample_ingredient(&store.id, "Milk", 1)).await.unwrap();
        let beans = db.ingredients().insert(&sample_ingredient(&store.id, "Beans", 1)).await.unwrap();

        let names: Vec<_> = db
            .ingredients()
            .list_by_store(&store.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Beans", "Milk"]);

        let found = db
            .ingredients()
            .get_many(&[milk.id.clone(), beans.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains_key(&milk.id));
    }
}
