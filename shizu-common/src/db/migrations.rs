//! Database schema migrations
//!
//! Column additions are handled by the table descriptions (see `schema.rs`).
//! Anything else goes here as a numbered migration:
//!
//! 1. Never modify an existing migration, add a new one
//! 2. Each migration runs in its own transaction and must be idempotent
//! 3. Bump `CURRENT_SCHEMA_VERSION` with every new migration

use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

/// Current schema version
const CURRENT_SCHEMA_VERSION: i64 = 1;

pub(crate) async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns 0 for a database that has never been migrated
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i64> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(pool)
            .await?;
    Ok(version.unwrap_or(0))
}

async fn set_schema_version(conn: &mut SqliteConnection, version: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        let mut tx = pool.begin().await?;
        migrate_v1(&mut *tx).await?;
        set_schema_version(&mut *tx, 1).await?;
        tx.commit().await?;
        info!("✓ Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: compact DJ lineup positions
///
/// Databases written before slot moves were transactional can hold lineups
/// with gaps or repeated positions. Renumber every event's slots to
/// 0..n-1, keeping their current order (ties broken by DJ name).
async fn migrate_v1(conn: &mut SqliteConnection) -> Result<()> {
    let slots: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT event, dj, position FROM event_djs ORDER BY event, position, dj",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut current_event: Option<String> = None;
    let mut next_position = 0i64;
    let mut repaired = 0usize;

    for (event, dj, position) in slots {
        if current_event.as_deref() != Some(event.as_str()) {
            current_event = Some(event.clone());
            next_position = 0;
        }

        if position != next_position {
            sqlx::query("UPDATE event_djs SET position = ? WHERE event = ? AND dj = ?")
                .bind(next_position)
                .bind(&event)
                .bind(&dj)
                .execute(&mut *conn)
                .await?;
            repaired += 1;
        }
        next_position += 1;
    }

    if repaired > 0 {
        info!("  ✓ Renumbered {} lineup slot(s)", repaired);
    }
    Ok(())
}
