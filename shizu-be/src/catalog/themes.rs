//! Stream themes

use crate::patch::{apply, nullable};
use crate::validate::{self, WriteMode};
use serde::Deserialize;
use shizu_common::db::models::Theme;
use shizu_common::db::store;
use shizu_common::Result;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemePatch {
    #[serde(default, deserialize_with = "nullable")]
    pub overlay_file: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub stinger_file: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub starting_file: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ending_file: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub starting_bgm_file: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub target_video_width: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub target_video_height: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub video_offset_x: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub video_offset_y: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub chat_width: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub chat_height: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub chat_offset_x: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub chat_offset_y: Option<Option<i64>>,
}

impl ThemePatch {
    fn apply_to(self, theme: &mut Theme) {
        apply(&mut theme.overlay_file, self.overlay_file);
        apply(&mut theme.stinger_file, self.stinger_file);
        apply(&mut theme.starting_file, self.starting_file);
        apply(&mut theme.ending_file, self.ending_file);
        apply(&mut theme.starting_bgm_file, self.starting_bgm_file);
        apply(&mut theme.target_video_width, self.target_video_width);
        apply(&mut theme.target_video_height, self.target_video_height);
        apply(&mut theme.video_offset_x, self.video_offset_x);
        apply(&mut theme.video_offset_y, self.video_offset_y);
        apply(&mut theme.chat_width, self.chat_width);
        apply(&mut theme.chat_height, self.chat_height);
        apply(&mut theme.chat_offset_x, self.chat_offset_x);
        apply(&mut theme.chat_offset_y, self.chat_offset_y);
    }
}

pub async fn list_themes(pool: &SqlitePool) -> Result<Vec<Theme>> {
    let mut conn = pool.acquire().await?;
    store::list(&mut conn).await
}

pub async fn get_theme(pool: &SqlitePool, name: &str) -> Result<Theme> {
    let mut conn = pool.acquire().await?;
    store::fetch(&mut conn, &[name]).await
}

pub async fn create_theme(pool: &SqlitePool, theme: &Theme) -> Result<()> {
    let mut conn = pool.acquire().await?;
    validate::validate_theme(&mut conn, theme, WriteMode::Insert).await?;
    store::insert(&mut conn, theme).await?;
    info!("Created theme {}", theme.name);
    Ok(())
}

pub async fn update_theme(pool: &SqlitePool, name: &str, patch: ThemePatch) -> Result<Theme> {
    let mut conn = pool.acquire().await?;
    let mut theme: Theme = store::fetch(&mut conn, &[name]).await?;
    patch.apply_to(&mut theme);

    validate::validate_theme(&mut conn, &theme, WriteMode::Update).await?;
    store::update(&mut conn, &theme).await?;
    info!("Updated theme {}", name);
    Ok(theme)
}

/// Delete a theme; events using it are left without a theme
pub async fn delete_theme(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    store::fetch::<Theme>(&mut *tx, &[name]).await?;
    let cleared = store::clear_references(&mut *tx, "events", "theme", name).await?;
    store::delete::<Theme>(&mut *tx, &[name]).await?;
    tx.commit().await?;

    info!("Deleted theme {} ({} event(s) cleared)", name, cleared);
    Ok(())
}
