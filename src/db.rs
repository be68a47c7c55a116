//! Database module
//!
//! Database connection and schema utilities.

use sqlx::{Executor, PgPool};

/// Account table and its active-number index
const SCHEMA_SQL: &str = include_str!("../migrations/001_create_account.sql");

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Create the account table and indexes if they are missing
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    // No bind parameters, so this runs as a simple multi-statement query
    pool.execute(SCHEMA_SQL).await?;

    tracing::info!("Account schema ensured");
    Ok(())
}

/// Check if required tables and indexes exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = 'account'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        tracing::error!("Required table 'account' does not exist");
        return Ok(false);
    }

    let index_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM pg_indexes
            WHERE schemaname = 'public' AND indexname = 'account_number_active_idx'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !index_exists {
        tracing::error!("Unique index 'account_number_active_idx' does not exist");
        return Ok(false);
    }

    Ok(true)
}
