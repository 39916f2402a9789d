//! Ordered lineup management
//!
//! Keeps each event's DJ slots and promo slots densely numbered from 0.
//! Every [`LineupManager`] operation runs in one transaction: validation
//! happens before the first write, and a failure part way through a shift
//! rolls the whole operation back.

pub mod dj_slots;
pub mod promo_slots;

use crate::patch::nullable;
use serde::{Deserialize, Serialize};
use shizu_common::db::models::{Event, EventDj};
use shizu_common::db::store;
use shizu_common::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Slot attributes supplied when adding a DJ to an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDjSlot {
    pub dj: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub vj: Option<String>,
    #[serde(default)]
    pub recording: Option<String>,
    #[serde(default)]
    pub visuals: Option<String>,
    #[serde(default)]
    pub use_generic_visuals: bool,
}

impl NewDjSlot {
    pub fn new(dj: impl Into<String>) -> Self {
        Self {
            dj: dj.into(),
            ..Default::default()
        }
    }

    pub(crate) fn to_record(&self, event: &str, position: i64) -> EventDj {
        EventDj {
            event: event.to_string(),
            dj: self.dj.clone(),
            position,
            is_live: self.is_live,
            vj: self.vj.clone(),
            recording: self.recording.clone(),
            visuals: self.visuals.clone(),
            use_generic_visuals: self.use_generic_visuals,
        }
    }
}

/// Fields to change on an existing slot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DjSlotPatch {
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub vj: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub recording: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub visuals: Option<Option<String>>,
    #[serde(default)]
    pub use_generic_visuals: Option<bool>,
}

/// Transactional entry point for lineup edits
#[derive(Clone)]
pub struct LineupManager {
    db: SqlitePool,
}

impl LineupManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn dj_slots(&self, event: &str) -> Result<Vec<EventDj>> {
        let mut conn = self.db.acquire().await?;
        store::fetch::<Event>(&mut conn, &[event]).await?;
        dj_slots::list(&mut conn, event).await
    }

    pub async fn append_dj(&self, event: &str, slot: &NewDjSlot) -> Result<EventDj> {
        let mut tx = self.db.begin().await?;
        let record = dj_slots::append(&mut *tx, event, slot).await?;
        tx.commit().await?;
        info!("Added DJ {} to {} at position {}", record.dj, event, record.position);
        Ok(record)
    }

    pub async fn update_dj(&self, event: &str, dj: &str, patch: &DjSlotPatch) -> Result<EventDj> {
        let mut tx = self.db.begin().await?;
        let record = dj_slots::update(&mut *tx, event, dj, patch).await?;
        tx.commit().await?;
        info!("Updated DJ {} in {}", dj, event);
        Ok(record)
    }

    pub async fn move_dj(&self, event: &str, index_a: usize, index_b: usize) -> Result<Vec<EventDj>> {
        let mut tx = self.db.begin().await?;
        dj_slots::move_slot(&mut *tx, event, index_a, index_b).await?;
        let slots = dj_slots::list(&mut *tx, event).await?;
        tx.commit().await?;
        info!("Moved DJ slot {} -> {} in {}", index_a, index_b, event);
        Ok(slots)
    }

    pub async fn remove_dj(&self, event: &str, dj: &str) -> Result<Vec<EventDj>> {
        let mut tx = self.db.begin().await?;
        dj_slots::remove(&mut *tx, event, dj).await?;
        let slots = dj_slots::list(&mut *tx, event).await?;
        tx.commit().await?;
        info!("Removed DJ {} from {}", dj, event);
        Ok(slots)
    }

    pub async fn replace_djs(&self, event: &str, desired: &[NewDjSlot]) -> Result<Vec<EventDj>> {
        let mut tx = self.db.begin().await?;
        let slots = dj_slots::replace(&mut *tx, event, desired).await?;
        tx.commit().await?;
        info!("Replaced DJ lineup of {} ({} slots)", event, slots.len());
        Ok(slots)
    }

    pub async fn promo_slots(&self, event: &str) -> Result<Vec<String>> {
        let mut conn = self.db.acquire().await?;
        promo_slots::list(&mut conn, event).await
    }

    pub async fn append_promo(&self, event: &str, promo: &str) -> Result<Vec<String>> {
        let mut tx = self.db.begin().await?;
        let promos = promo_slots::append(&mut *tx, event, promo).await?;
        tx.commit().await?;
        info!("Added promo {} to {}", promo, event);
        Ok(promos)
    }

    pub async fn move_promo(&self, event: &str, index_a: usize, index_b: usize) -> Result<Vec<String>> {
        let mut tx = self.db.begin().await?;
        let promos = promo_slots::move_slot(&mut *tx, event, index_a, index_b).await?;
        tx.commit().await?;
        info!("Moved promo slot {} -> {} in {}", index_a, index_b, event);
        Ok(promos)
    }

    pub async fn remove_promo(&self, event: &str, promo: &str) -> Result<Vec<String>> {
        let mut tx = self.db.begin().await?;
        let promos = promo_slots::remove(&mut *tx, event, promo).await?;
        tx.commit().await?;
        info!("Removed promo {} from {}", promo, event);
        Ok(promos)
    }

    pub async fn replace_promos(&self, event: &str, desired: &[String]) -> Result<Vec<String>> {
        let mut tx = self.db.begin().await?;
        let promos = promo_slots::replace(&mut *tx, event, desired).await?;
        tx.commit().await?;
        info!("Replaced promo lineup of {} ({} slots)", event, promos.len());
        Ok(promos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_clear_from_keep() {
        let patch: DjSlotPatch =
            serde_json::from_str(r#"{"is_live": true, "recording": null}"#).unwrap();
        assert_eq!(patch.is_live, Some(true));
        assert_eq!(patch.recording, Some(None));
        assert_eq!(patch.vj, None);
        assert_eq!(patch.use_generic_visuals, None);
    }

    #[test]
    fn test_new_slot_defaults() {
        let slot: NewDjSlot = serde_json::from_str(r#"{"dj": "alice"}"#).unwrap();
        assert_eq!(slot, NewDjSlot::new("alice"));
        let record = slot.to_record("launch", 3);
        assert_eq!(record.position, 3);
        assert!(!record.is_live);
    }
}
