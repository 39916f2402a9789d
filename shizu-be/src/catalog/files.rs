//! Media file records

use crate::patch::{apply, nullable};
use crate::validate::{self, WriteMode};
use serde::Deserialize;
use shizu_common::db::models::{File, FileRoot, Theme};
use shizu_common::db::store;
use shizu_common::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Columns outside `themes` that hold file references
const FILE_REFERENCES: [(&str, &str); 4] = [
    ("promos", "promo_file"),
    ("djs", "logo"),
    ("event_djs", "recording"),
    ("event_djs", "visuals"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilePatch {
    #[serde(default)]
    pub root: Option<FileRoot>,
    #[serde(default, deserialize_with = "nullable")]
    pub file_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub url_path: Option<Option<String>>,
}

pub async fn list_files(pool: &SqlitePool) -> Result<Vec<File>> {
    let mut conn = pool.acquire().await?;
    store::list(&mut conn).await
}

pub async fn get_file(pool: &SqlitePool, name: &str) -> Result<File> {
    let mut conn = pool.acquire().await?;
    store::fetch(&mut conn, &[name]).await
}

pub async fn create_file(pool: &SqlitePool, file: &File) -> Result<()> {
    let mut conn = pool.acquire().await?;
    validate::validate_file(&mut conn, file, WriteMode::Insert).await?;
    store::insert(&mut conn, file).await?;
    info!("Created file {} ({})", file.name, file.root);
    Ok(())
}

pub async fn update_file(pool: &SqlitePool, name: &str, patch: FilePatch) -> Result<File> {
    let mut conn = pool.acquire().await?;
    let mut file: File = store::fetch(&mut conn, &[name]).await?;

    apply(&mut file.root, patch.root);
    apply(&mut file.file_path, patch.file_path);
    apply(&mut file.url_path, patch.url_path);

    validate::validate_file(&mut conn, &file, WriteMode::Update).await?;
    store::update(&mut conn, &file).await?;
    info!("Updated file {}", name);
    Ok(file)
}

/// Delete a file after clearing every reference to it
pub async fn delete_file(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    store::fetch::<File>(&mut *tx, &[name]).await?;

    let mut cleared = 0;
    for column in Theme::FILE_COLUMNS {
        cleared += store::clear_references(&mut *tx, "themes", column, name).await?;
    }
    for (table, column) in FILE_REFERENCES {
        cleared += store::clear_references(&mut *tx, table, column, name).await?;
    }

    store::delete::<File>(&mut *tx, &[name]).await?;
    tx.commit().await?;

    info!("Deleted file {} ({} reference(s) cleared)", name, cleared);
    Ok(())
}
