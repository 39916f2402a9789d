//! DJ slot ordering on one connection
//!
//! Positions of an event's slots are always exactly `0..n`. Every function
//! here runs on the connection it is given; callers that perform several
//! writes pass a transaction so a failure leaves the lineup untouched.

use super::{DjSlotPatch, NewDjSlot};
use crate::patch::apply;
use crate::validate::{self, WriteMode};
use shizu_common::db::models::{Event, EventDj};
use shizu_common::db::store;
use shizu_common::{EntityKind, Error, Result};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::debug;

/// Slots of `event` ordered by position
pub async fn list(conn: &mut SqliteConnection, event: &str) -> Result<Vec<EventDj>> {
    let rows = sqlx::query("SELECT * FROM event_djs WHERE event = ? ORDER BY position")
        .bind(event)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(<EventDj as store::Entity>::from_row).collect()
}

/// Every slot a DJ holds, across events
pub async fn slots_for_dj(conn: &mut SqliteConnection, dj: &str) -> Result<Vec<EventDj>> {
    let rows = sqlx::query("SELECT * FROM event_djs WHERE dj = ? ORDER BY event, position")
        .bind(dj)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(<EventDj as store::Entity>::from_row).collect()
}

async fn count(conn: &mut SqliteConnection, event: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_djs WHERE event = ?")
        .bind(event)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

async fn set_position(
    conn: &mut SqliteConnection,
    event: &str,
    dj: &str,
    position: i64,
) -> Result<()> {
    sqlx::query("UPDATE event_djs SET position = ? WHERE event = ? AND dj = ?")
        .bind(position)
        .bind(event)
        .bind(dj)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Add a slot at the end of the lineup
pub async fn append(conn: &mut SqliteConnection, event: &str, slot: &NewDjSlot) -> Result<EventDj> {
    let mut record = slot.to_record(event, 0);
    validate::validate_event_dj(conn, &record, WriteMode::Insert).await?;

    record.position = count(conn, event).await?;
    store::insert(conn, &record).await?;
    debug!("Appended {} to {} at {}", record.dj, event, record.position);
    Ok(record)
}

/// Overwrite the supplied fields; position is never touched
pub async fn update(
    conn: &mut SqliteConnection,
    event: &str,
    dj: &str,
    patch: &DjSlotPatch,
) -> Result<EventDj> {
    let mut record: EventDj = store::fetch(conn, &[event, dj]).await?;

    apply(&mut record.is_live, patch.is_live);
    apply(&mut record.vj, patch.vj.clone());
    apply(&mut record.recording, patch.recording.clone());
    apply(&mut record.visuals, patch.visuals.clone());
    apply(&mut record.use_generic_visuals, patch.use_generic_visuals);

    validate::validate_event_dj(conn, &record, WriteMode::Update).await?;
    store::update(conn, &record).await?;
    Ok(record)
}

/// Move the slot at `index_a` to `index_b`, shifting the slots in between
///
/// Moving earlier shifts `[b, a)` up by one, moving later shifts `(a, b]`
/// down by one. Each shift is its own UPDATE.
pub async fn move_slot(
    conn: &mut SqliteConnection,
    event: &str,
    index_a: usize,
    index_b: usize,
) -> Result<()> {
    store::fetch::<Event>(conn, &[event]).await?;
    let slots = list(conn, event).await?;

    if index_a >= slots.len() || index_b >= slots.len() {
        return Err(Error::InvalidRange {
            index_a,
            index_b,
            len: slots.len(),
        });
    }
    if index_a == index_b {
        return Ok(());
    }

    let moved = &slots[index_a];
    if index_a > index_b {
        for slot in &slots[index_b..index_a] {
            set_position(conn, event, &slot.dj, slot.position + 1).await?;
        }
    } else {
        for slot in &slots[index_a + 1..=index_b] {
            set_position(conn, event, &slot.dj, slot.position - 1).await?;
        }
    }
    set_position(conn, event, &moved.dj, index_b as i64).await?;

    debug!("Moved {} in {} from {} to {}", moved.dj, event, index_a, index_b);
    Ok(())
}

/// Delete a slot and close the gap it leaves
pub async fn remove(conn: &mut SqliteConnection, event: &str, dj: &str) -> Result<EventDj> {
    let removed: EventDj = store::fetch(conn, &[event, dj]).await?;
    store::delete::<EventDj>(conn, &[event, dj]).await?;

    for slot in list(conn, event).await? {
        if slot.position > removed.position {
            set_position(conn, event, &slot.dj, slot.position - 1).await?;
        }
    }

    debug!("Removed {} from {} (was at {})", dj, event, removed.position);
    Ok(removed)
}

/// Make the lineup exactly `desired`, in that order
///
/// Slots missing from `desired` are deleted, retained ones are updated in
/// place and new ones inserted; every entry gets its array index as position.
pub async fn replace(
    conn: &mut SqliteConnection,
    event: &str,
    desired: &[NewDjSlot],
) -> Result<Vec<EventDj>> {
    store::fetch::<Event>(conn, &[event]).await?;

    let mut seen = HashSet::new();
    for slot in desired {
        if !seen.insert(slot.dj.as_str()) {
            return Err(Error::already_exists(
                EntityKind::DjSlot,
                format!("{}/{}", event, slot.dj),
            ));
        }
    }

    let existing = list(conn, event).await?;
    let existing_djs: HashSet<&str> = existing.iter().map(|s| s.dj.as_str()).collect();

    let mut records = Vec::with_capacity(desired.len());
    for (index, slot) in desired.iter().enumerate() {
        let record = slot.to_record(event, index as i64);
        let mode = if existing_djs.contains(slot.dj.as_str()) {
            WriteMode::Update
        } else {
            WriteMode::Insert
        };
        validate::validate_event_dj(conn, &record, mode).await?;
        records.push((record, mode));
    }

    for slot in existing.iter().filter(|s| !seen.contains(s.dj.as_str())) {
        store::delete::<EventDj>(conn, &[event, slot.dj.as_str()]).await?;
    }

    for (record, mode) in &records {
        match mode {
            WriteMode::Insert => store::insert(conn, record).await?,
            WriteMode::Update => store::update(conn, record).await?,
        }
    }

    Ok(records.into_iter().map(|(record, _)| record).collect())
}
