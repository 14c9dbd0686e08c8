//! # Payment Settings Repository
//!
//! One settings row per store, upserted as a whole.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use ingreventory_core::{CustomPaymentMethod, PaymentOption, PaymentSetting};

#[derive(Debug, FromRow)]
struct PaymentSettingRow {
    id: String,
    store_id: String,
    options_json: String,
    custom_methods_json: String,
}

impl TryFrom<PaymentSettingRow> for PaymentSetting {
    type Error = DbError;

    fn try_from(row: PaymentSettingRow) -> Result<Self, Self::Error> {
        let options: Vec<PaymentOption> =
            serde_json::from_str(&row.options_json).map_err(|e| DbError::corrupt("PaymentSetting", &row.id, e))?;
        let custom_methods: Vec<CustomPaymentMethod> = serde_json::from_str(&row.custom_methods_json)
            .map_err(|e| DbError::corrupt("PaymentSetting", &row.id, e))?;

        Ok(PaymentSetting {
            id: row.id,
            store_id: row.store_id,
            options,
            custom_methods,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PaymentSettingRepository {
    pool: SqlitePool,
}

impl PaymentSettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentSettingRepository { pool }
    }

    pub async fn get_by_store(&self, store_id: &str) -> DbResult<Option<PaymentSetting>> {
        let row = sqlx::query_as::<_, PaymentSettingRow>(
            "SELECT id, store_id, options_json, custom_methods_json FROM payment_settings WHERE store_id = ?1",
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentSetting::try_from).transpose()
    }

    /// Returns the store's settings, creating an empty row when missing.
    pub async fn get_or_create(&self, store_id: &str) -> DbResult<PaymentSetting> {
        if let Some(existing) = self.get_by_store(store_id).await? {
            return Ok(existing);
        }

        self.upsert(store_id, &[], &[]).await
    }

    /// Replaces the options and custom methods of a store's settings.
    pub async fn upsert(
        &self,
        store_id: &str,
        options: &[PaymentOption],
        custom_methods: &[CustomPaymentMethod],
    ) -> DbResult<PaymentSetting> {
        debug!(store_id = %store_id, options = options.len(), custom = custom_methods.len(), "Saving payment settings");

        let options_json = serde_json::to_string(options).map_err(|e| DbError::Internal(e.to_string()))?;
        let custom_json = serde_json::to_string(custom_methods).map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO payment_settings (id, store_id, options_json, custom_methods_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(store_id) DO UPDATE SET
                options_json = excluded.options_json,
                custom_methods_json = excluded.custom_methods_json
            "#,
        )
        .bind(generate_id())
        .bind(store_id)
        .bind(&options_json)
        .bind(&custom_json)
        .execute(&self.pool)
        .await?;

        self.get_by_store(store_id)
            .await?
            .ok_or_else(|| DbError::not_found("PaymentSetting", store_id))
    }
}
