//! # Category Repository
//!
//! Store-scoped categories. Slugs are unique within a store; listings carry
//! the number of products in each category.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::Category;

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    store_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    product_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            is_active: row.is_active,
            product_count: row.product_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_WITH_COUNT: &str = r#"
    SELECT
        c.id, c.store_id, c.name, c.slug, c.description, c.is_active,
        (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count,
        c.created_at, c.updated_at
    FROM categories c
"#;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Categories of a store, newest first.
    pub async fn list_by_store(&self, store_id: &str) -> DbResult<Vec<Category>> {
        let sql = format!("{SELECT_WITH_COUNT} WHERE c.store_id = ?1 ORDER BY c.created_at DESC");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let sql = format!("{SELECT_WITH_COUNT} WHERE c.id = ?1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Category::from))
    }

    pub async fn slug_exists(&self, store_id: &str, slug: &str, except_id: Option<&str>) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE store_id = ?1 AND slug = ?2 AND id != ?3")
                .bind(store_id)
                .bind(slug)
                .bind(except_id.unwrap_or(""))
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Inserts a category.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` when the slug exists in the store
    /// - `DbError::ForeignKeyViolation` when the store does not exist
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, slug = %category.slug, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, store_id, name, slug, description, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&category.id)
        .bind(&category.store_id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("slug", &category.slug),
            other => other,
        })?;

        let mut inserted = category.clone();
        inserted.product_count = 0;
        Ok(inserted)
    }

    pub async fn update(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, "Updating category");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE categories SET name = ?2, slug = ?3, description = ?4, is_active = ?5, updated_at = ?6 WHERE id = ?1",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("slug", &category.slug),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        self.get_by_id(&category.id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", &category.id))
    }

    /// Deletes a category.
    ///
    /// ## Errors
    /// `DbError::ForeignKeyViolation` while products still reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }
}
