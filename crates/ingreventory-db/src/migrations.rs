//! # Database Migrations
//!
//! Embedded SQL migrations for Ingreventory.
//!
//! ```text
//! Startup ──► _sqlx_migrations present? ──► apply pending NNN_*.sql in order
//! ```
//!
//! New migrations go in `migrations/sqlite/` as `NNN_description.sql`.
//! Existing migrations are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        available = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for health reporting.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
