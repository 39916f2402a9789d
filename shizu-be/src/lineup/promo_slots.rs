//! Promo slot ordering
//!
//! An event's promo lineup is the `promos` list on the event row; the array
//! index is the position, so every mutation rewrites the whole list.

use crate::validate;
use shizu_common::db::models::{Event, Promo};
use shizu_common::db::store;
use shizu_common::{EntityKind, Error, Result};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::debug;

fn slot_name(event: &str, promo: &str) -> String {
    format!("{}/{}", event, promo)
}

pub async fn list(conn: &mut SqliteConnection, event: &str) -> Result<Vec<String>> {
    let event: Event = store::fetch(conn, &[event]).await?;
    Ok(event.promos)
}

/// Events whose promo lineup contains `promo`
pub async fn events_containing(conn: &mut SqliteConnection, promo: &str) -> Result<Vec<Event>> {
    let rows = sqlx::query(
        "SELECT * FROM events WHERE EXISTS (SELECT 1 FROM json_each(events.promos) WHERE value = ?) ORDER BY name",
    )
    .bind(promo)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(<Event as store::Entity>::from_row).collect()
}

pub async fn append(conn: &mut SqliteConnection, event: &str, promo: &str) -> Result<Vec<String>> {
    let mut record: Event = store::fetch(conn, &[event]).await?;
    validate::require::<Promo>(conn, promo, "promo").await?;
    if record.promos.iter().any(|p| p == promo) {
        return Err(Error::already_exists(EntityKind::PromoSlot, slot_name(event, promo)));
    }

    record.promos.push(promo.to_string());
    store::update(conn, &record).await?;
    debug!("Appended promo {} to {}", promo, event);
    Ok(record.promos)
}

pub async fn move_slot(
    conn: &mut SqliteConnection,
    event: &str,
    index_a: usize,
    index_b: usize,
) -> Result<Vec<String>> {
    let mut record: Event = store::fetch(conn, &[event]).await?;
    let len = record.promos.len();
    if index_a >= len || index_b >= len {
        return Err(Error::InvalidRange { index_a, index_b, len });
    }
    if index_a == index_b {
        return Ok(record.promos);
    }

    let moved = record.promos.remove(index_a);
    record.promos.insert(index_b, moved);
    store::update(conn, &record).await?;
    Ok(record.promos)
}

pub async fn remove(conn: &mut SqliteConnection, event: &str, promo: &str) -> Result<Vec<String>> {
    let mut record: Event = store::fetch(conn, &[event]).await?;
    let position = record
        .promos
        .iter()
        .position(|p| p == promo)
        .ok_or_else(|| Error::not_found(EntityKind::PromoSlot, slot_name(event, promo)))?;

    record.promos.remove(position);
    store::update(conn, &record).await?;
    debug!("Removed promo {} from {} (was at {})", promo, event, position);
    Ok(record.promos)
}

pub async fn replace(
    conn: &mut SqliteConnection,
    event: &str,
    desired: &[String],
) -> Result<Vec<String>> {
    let mut record: Event = store::fetch(conn, &[event]).await?;

    let mut seen = HashSet::new();
    for promo in desired {
        if !seen.insert(promo.as_str()) {
            return Err(Error::already_exists(EntityKind::PromoSlot, slot_name(event, promo)));
        }
        validate::require::<Promo>(conn, promo, "promos").await?;
    }

    record.promos = desired.to_vec();
    store::update(conn, &record).await?;
    Ok(record.promos)
}
