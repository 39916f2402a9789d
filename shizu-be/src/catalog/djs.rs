//! DJ records

use crate::lineup::dj_slots;
use crate::patch::{apply, nullable};
use crate::validate::{self, WriteMode};
use serde::Deserialize;
use shizu_common::db::models::Dj;
use shizu_common::db::store;
use shizu_common::Result;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DjPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub logo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub rtmp_server: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub rtmp_key: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub public_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub discord_id: Option<Option<String>>,
    #[serde(default)]
    pub past_events: Option<Vec<String>>,
}

pub async fn list_djs(pool: &SqlitePool) -> Result<Vec<Dj>> {
    let mut conn = pool.acquire().await?;
    store::list(&mut conn).await
}

pub async fn get_dj(pool: &SqlitePool, name: &str) -> Result<Dj> {
    let mut conn = pool.acquire().await?;
    store::fetch(&mut conn, &[name]).await
}

pub async fn create_dj(pool: &SqlitePool, dj: &Dj) -> Result<()> {
    let mut conn = pool.acquire().await?;
    validate::validate_dj(&mut conn, dj, WriteMode::Insert).await?;
    store::insert(&mut conn, dj).await?;
    info!("Created DJ {}", dj.name);
    Ok(())
}

pub async fn update_dj(pool: &SqlitePool, name: &str, patch: DjPatch) -> Result<Dj> {
    let mut conn = pool.acquire().await?;
    let mut dj: Dj = store::fetch(&mut conn, &[name]).await?;

    apply(&mut dj.logo, patch.logo);
    apply(&mut dj.rtmp_server, patch.rtmp_server);
    apply(&mut dj.rtmp_key, patch.rtmp_key);
    apply(&mut dj.public_name, patch.public_name);
    apply(&mut dj.discord_id, patch.discord_id);
    apply(&mut dj.past_events, patch.past_events);

    validate::validate_dj(&mut conn, &dj, WriteMode::Update).await?;
    store::update(&mut conn, &dj).await?;
    info!("Updated DJ {}", name);
    Ok(dj)
}

/// Delete a DJ and remove its slot from every event lineup
pub async fn delete_dj(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    store::fetch::<Dj>(&mut *tx, &[name]).await?;

    let slots = dj_slots::slots_for_dj(&mut *tx, name).await?;
    for slot in &slots {
        dj_slots::remove(&mut *tx, &slot.event, name).await?;
    }

    store::delete::<Dj>(&mut *tx, &[name]).await?;
    tx.commit().await?;

    info!("Deleted DJ {} (removed from {} event(s))", name, slots.len());
    Ok(())
}
