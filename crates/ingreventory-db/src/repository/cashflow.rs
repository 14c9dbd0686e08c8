//! # Cashflow Repository
//!
//! Manual till movements (`in` / `out`) per store.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use ingreventory_core::{Cashflow, CashflowType};

#[derive(Debug, FromRow)]
struct CashflowRow {
    id: String,
    flow_type: CashflowType,
    amount_cents: i64,
    note: Option<String>,
    user_id: Option<String>,
    store_id: String,
    created_at: DateTime<Utc>,
}

impl From<CashflowRow> for Cashflow {
    fn from(row: CashflowRow) -> Self {
        Cashflow {
            id: row.id,
            flow_type: row.flow_type,
            amount_cents: row.amount_cents,
            note: row.note,
            user_id: row.user_id,
            store_id: row.store_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CashflowRepository {
    pool: SqlitePool,
}

impl CashflowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashflowRepository { pool }
    }

    pub async fn insert(&self, entry: &Cashflow) -> DbResult<Cashflow> {
        debug!(
            id = %entry.id,
            store_id = %entry.store_id,
            amount_cents = entry.amount_cents,
            "Recording cashflow entry"
        );

        sqlx::query(
            r#"
            INSERT INTO cashflows (id, flow_type, amount_cents, note, user_id, store_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.flow_type)
        .bind(entry.amount_cents)
        .bind(&entry.note)
        .bind(&entry.user_id)
        .bind(&entry.store_id)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry.clone())
    }

    /// Entries of a store created within `[start, end]`, oldest first.
    pub async fn list_by_store_between(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Cashflow>> {
        let rows = sqlx::query_as::<_, CashflowRow>(
            r#"
            SELECT id, flow_type, amount_cents, note, user_id, store_id, created_at
            FROM cashflows
            WHERE store_id = ?1 AND created_at >= ?2 AND created_at <= ?3
            ORDER BY created_at
            "#,
        )
        .bind(store_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cashflow::from).collect())
    }
}
