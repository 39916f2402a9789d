//! Events and their metadata
//!
//! Lineup ordering lives in [`crate::lineup`]; this module covers the event
//! row itself. Creating an event with an initial lineup goes through the
//! same append path as later edits.

use crate::lineup::{dj_slots, promo_slots, NewDjSlot};
use crate::patch::{apply, nullable};
use crate::validate::{self, WriteMode};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shizu_common::db::models::{Event, EventDj};
use shizu_common::db::store;
use shizu_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// An event with its DJ lineup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub djs: Vec<EventDj>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub promos: Vec<String>,
    #[serde(default)]
    pub djs: Vec<NewDjSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub theme: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_time: Option<Option<String>>,
}

fn check_date_time(date: Option<&str>, start_time: Option<&str>) -> Result<()> {
    if let Some(date) = date {
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            Error::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", date))
        })?;
    }
    if let Some(time) = start_time {
        NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| {
            Error::InvalidInput(format!("Invalid start time '{}', expected HH:MM", time))
        })?;
    }
    Ok(())
}

async fn view(conn: &mut SqliteConnection, name: &str) -> Result<EventView> {
    let event: Event = store::fetch(conn, &[name]).await?;
    let djs = dj_slots::list(conn, name).await?;
    Ok(EventView { event, djs })
}

/// Events, most recent first; undated events last
pub async fn list_events(pool: &SqlitePool) -> Result<Vec<Event>> {
    let mut conn = pool.acquire().await?;
    store::list(&mut conn).await
}

pub async fn list_event_names(pool: &SqlitePool) -> Result<Vec<String>> {
    Ok(list_events(pool).await?.into_iter().map(|e| e.name).collect())
}

pub async fn get_event(pool: &SqlitePool, name: &str) -> Result<EventView> {
    let mut conn = pool.acquire().await?;
    view(&mut conn, name).await
}

/// Create an event, optionally with an initial lineup
pub async fn create_event(pool: &SqlitePool, new: NewEvent) -> Result<EventView> {
    validate::check_event_name(&new.name)?;
    check_date_time(new.date.as_deref(), new.start_time.as_deref())?;

    let event = Event {
        name: new.name.clone(),
        promos: Vec::new(),
        theme: new.theme,
        date: new.date,
        start_time: new.start_time,
        public: new.public,
    };

    let mut tx = pool.begin().await?;
    validate::validate_event(&mut *tx, &event, WriteMode::Insert).await?;
    store::insert(&mut *tx, &event).await?;
    for promo in &new.promos {
        promo_slots::append(&mut *tx, &event.name, promo).await?;
    }
    for slot in &new.djs {
        dj_slots::append(&mut *tx, &event.name, slot).await?;
    }
    let created = view(&mut *tx, &event.name).await?;
    tx.commit().await?;

    info!(
        "Created event {} ({} DJs, {} promos)",
        created.event.name,
        created.djs.len(),
        created.event.promos.len()
    );
    Ok(created)
}

pub async fn update_event(pool: &SqlitePool, name: &str, patch: EventPatch) -> Result<EventView> {
    let mut conn = pool.acquire().await?;
    let mut event: Event = store::fetch(&mut conn, &[name]).await?;

    apply(&mut event.public, patch.public);
    apply(&mut event.theme, patch.theme);
    apply(&mut event.date, patch.date);
    apply(&mut event.start_time, patch.start_time);

    check_date_time(event.date.as_deref(), event.start_time.as_deref())?;
    validate::validate_event(&mut conn, &event, WriteMode::Update).await?;
    store::update(&mut conn, &event).await?;
    info!("Updated event {}", name);
    view(&mut conn, name).await
}

/// Set or clear the event's theme
pub async fn set_theme(pool: &SqlitePool, name: &str, theme: Option<String>) -> Result<EventView> {
    update_event(
        pool,
        name,
        EventPatch {
            theme: Some(theme),
            ..Default::default()
        },
    )
    .await
}

pub async fn set_date_time(
    pool: &SqlitePool,
    name: &str,
    date: Option<String>,
    start_time: Option<String>,
) -> Result<EventView> {
    update_event(
        pool,
        name,
        EventPatch {
            date: Some(date),
            start_time: Some(start_time),
            ..Default::default()
        },
    )
    .await
}

/// Delete an event together with its lineup
pub async fn delete_event(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    store::fetch::<Event>(&mut *tx, &[name]).await?;

    let removed = sqlx::query("DELETE FROM event_djs WHERE event = ?")
        .bind(name)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    store::delete::<Event>(&mut *tx, &[name]).await?;
    tx.commit().await?;

    info!("Deleted event {} ({} DJ slot(s))", name, removed);
    Ok(())
}
