//! # Store Repository
//!
//! Tenants. The slug is unique and is what storefronts resolve by.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::{BusinessType, Store, StoreAddress};

const STORE_COLUMNS: &str = r#"
    id, name, slug, street, city, state, zip_code, country,
    currency, currency_code, phone, email, business_type,
    tax_id, background_image, logo_image, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct StoreRow {
    id: String,
    name: String,
    slug: String,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    currency: String,
    currency_code: String,
    phone: String,
    email: String,
    business_type: BusinessType,
    tax_id: Option<String>,
    background_image: Option<String>,
    logo_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            name: row.name,
            slug: row.slug,
            address: StoreAddress {
                street: row.street,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
                country: row.country,
            },
            currency: row.currency,
            currency_code: row.currency_code,
            phone: row.phone,
            email: row.email,
            business_type: row.business_type,
            tax_id: row.tax_id,
            background_image: row.background_image,
            logo_image: row.logo_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1");
        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Store::from))
    }

    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Store>> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE slug = ?1");
        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Store::from))
    }

    /// Inserts a store.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the slug is taken.
    pub async fn insert(&self, store: &Store) -> DbResult<Store> {
        debug!(id = %store.id, slug = %store.slug, "Inserting store");

        sqlx::query(
            r#"
            INSERT INTO stores (
                id, name, slug, street, city, state, zip_code, country,
                currency, currency_code, phone, email, business_type,
                tax_id, background_image, logo_image, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.slug)
        .bind(&store.address.street)
        .bind(&store.address.city)
        .bind(&store.address.state)
        .bind(&store.address.zip_code)
        .bind(&store.address.country)
        .bind(&store.currency)
        .bind(&store.currency_code)
        .bind(&store.phone)
        .bind(&store.email)
        .bind(store.business_type)
        .bind(&store.tax_id)
        .bind(&store.background_image)
        .bind(&store.logo_image)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &store.slug),
            other => other,
        })?;

        Ok(store.clone())
    }

    /// Writes every mutable column of `store` and bumps `updated_at`.
    pub async fn update(&self, store: &Store) -> DbResult<Store> {
        debug!(id = %store.id, "Updating store");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE stores SET
                name = ?2, slug = ?3, street = ?4, city = ?5, state = ?6,
                zip_code = ?7, country = ?8, currency = ?9, currency_code = ?10,
                phone = ?11, email = ?12, business_type = ?13, tax_id = ?14,
                background_image = ?15, logo_image = ?16, updated_at = ?17
            WHERE id = ?1
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.slug)
        .bind(&store.address.street)
        .bind(&store.address.city)
        .bind(&store.address.state)
        .bind(&store.address.zip_code)
        .bind(&store.address.country)
        .bind(&store.currency)
        .bind(&store.currency_code)
        .bind(&store.phone)
        .bind(&store.email)
        .bind(store.business_type)
        .bind(&store.tax_id)
        .bind(&store.background_image)
        .bind(&store.logo_image)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", &store.id));
        }

        let mut updated = store.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    pub async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE slug = ?1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
