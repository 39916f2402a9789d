//! Promotional videos

use crate::lineup::promo_slots;
use crate::patch::{apply, nullable};
use crate::validate::{self, WriteMode};
use serde::Deserialize;
use shizu_common::db::models::Promo;
use shizu_common::db::store;
use shizu_common::Result;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub promo_file: Option<Option<String>>,
}

pub async fn list_promos(pool: &SqlitePool) -> Result<Vec<Promo>> {
    let mut conn = pool.acquire().await?;
    store::list(&mut conn).await
}

pub async fn get_promo(pool: &SqlitePool, name: &str) -> Result<Promo> {
    let mut conn = pool.acquire().await?;
    store::fetch(&mut conn, &[name]).await
}

pub async fn create_promo(pool: &SqlitePool, promo: &Promo) -> Result<()> {
    let mut conn = pool.acquire().await?;
    validate::validate_promo(&mut conn, promo, WriteMode::Insert).await?;
    store::insert(&mut conn, promo).await?;
    info!("Created promo {}", promo.name);
    Ok(())
}

pub async fn update_promo(pool: &SqlitePool, name: &str, patch: PromoPatch) -> Result<Promo> {
    let mut conn = pool.acquire().await?;
    let mut promo: Promo = store::fetch(&mut conn, &[name]).await?;
    apply(&mut promo.promo_file, patch.promo_file);

    validate::validate_promo(&mut conn, &promo, WriteMode::Update).await?;
    store::update(&mut conn, &promo).await?;
    info!("Updated promo {}", name);
    Ok(promo)
}

/// Delete a promo and take it out of every event's promo lineup
pub async fn delete_promo(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    store::fetch::<Promo>(&mut *tx, &[name]).await?;

    let events = promo_slots::events_containing(&mut *tx, name).await?;
    for event in &events {
        promo_slots::remove(&mut *tx, &event.name, name).await?;
    }

    store::delete::<Promo>(&mut *tx, &[name]).await?;
    tx.commit().await?;

    info!("Deleted promo {} (removed from {} event(s))", name, events.len());
    Ok(())
}
