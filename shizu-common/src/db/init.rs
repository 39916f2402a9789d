//! Database initialization
//!
//! Startup sequence:
//! 1. Open (or create) the database with foreign keys, WAL and a busy timeout
//! 2. Create every table from its declarative description, adding columns
//!    that are missing from older databases
//! 3. Run versioned migrations

use crate::db::models::{Dj, Event, EventDj, File, Promo, Theme};
use crate::db::schema::ensure_table;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database file, creating it and its parent directory if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    bootstrap(&pool).await?;
    Ok(pool)
}

/// Private in-memory database, used by tests and dry runs
///
/// Limited to one connection: every connection to `sqlite::memory:` is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    bootstrap(&pool).await?;
    Ok(pool)
}

/// Create tables, sync columns and run migrations (idempotent)
pub async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    crate::db::migrations::create_schema_version_table(pool).await?;

    ensure_table::<File>(pool).await?;
    ensure_table::<Theme>(pool).await?;
    ensure_table::<Promo>(pool).await?;
    ensure_table::<Dj>(pool).await?;
    ensure_table::<Event>(pool).await?;
    ensure_table::<EventDj>(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;
    Ok(())
}
