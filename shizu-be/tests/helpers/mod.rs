//! Shared fixtures for shizu-be integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use shizu_be::catalog::{djs, events, files, promos};
use shizu_be::export::{ExportAssembler, FetchError, MediaProbe, ProbeError, RemoteFetcher};
use shizu_be::lineup::{LineupManager, NewDjSlot};
use shizu_common::config::{MediaConfig, MediaRoots};
use shizu_common::db::init_memory_database;
use shizu_common::db::models::{Dj, File, FileRoot, Promo};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const RTMP_TEMPLATE: &str = "rtmp://{server}/live/{key}";

/// In-memory database plus media directories under a temporary root
pub struct TestEnv {
    pub db: SqlitePool,
    pub roots: MediaRoots,
    pub lineup: LineupManager,
    _root: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let root = TempDir::new().expect("temp root");
        let roots = MediaRoots::resolve(&MediaConfig::default(), root.path());
        roots.ensure_exist().expect("media directories");
        let db = init_memory_database().await.expect("in-memory database");
        Self {
            lineup: LineupManager::new(db.clone()),
            db,
            roots,
            _root: root,
        }
    }

    /// Create a local file record and the file on disk
    pub async fn local_file(&self, name: &str, root: FileRoot, relative: &str) {
        let path = self.roots.dir(root).join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, name.as_bytes()).unwrap();
        files::create_file(
            &self.db,
            &File {
                name: name.to_string(),
                root,
                file_path: Some(relative.to_string()),
                url_path: None,
            },
        )
        .await
        .unwrap();
    }

    /// Create a file record that only exists remotely
    pub async fn remote_file(&self, name: &str, root: FileRoot, url: &str) {
        files::create_file(
            &self.db,
            &File {
                name: name.to_string(),
                root,
                file_path: None,
                url_path: Some(url.to_string()),
            },
        )
        .await
        .unwrap();
    }

    pub async fn dj(&self, name: &str) {
        djs::create_dj(
            &self.db,
            &Dj {
                name: name.to_string(),
                rtmp_server: Some("ingest.example".to_string()),
                rtmp_key: Some(format!("{}-key", name.to_lowercase())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    pub async fn promo(&self, name: &str, file: Option<&str>) {
        promos::create_promo(
            &self.db,
            &Promo {
                name: name.to_string(),
                promo_file: file.map(String::from),
            },
        )
        .await
        .unwrap();
    }

    pub async fn event(&self, name: &str) {
        events::create_event(
            &self.db,
            events::NewEvent {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    /// "Launch" with Alice, Bob and Cara appended in that order
    pub async fn launch(&self) {
        for dj in ["Alice", "Bob", "Cara"] {
            self.dj(dj).await;
        }
        self.event("Launch").await;
        for dj in ["Alice", "Bob", "Cara"] {
            self.lineup.append_dj("Launch", &NewDjSlot::new(dj)).await.unwrap();
        }
    }

    pub async fn lineup_order(&self, event: &str) -> Vec<(String, i64)> {
        self.lineup
            .dj_slots(event)
            .await
            .unwrap()
            .into_iter()
            .map(|slot| (slot.dj, slot.position))
            .collect()
    }

    pub fn exporter(&self, probe: FakeProbe, fetcher: Arc<FakeFetcher>) -> ExportAssembler {
        ExportAssembler::new(
            self.db.clone(),
            self.roots.clone(),
            RTMP_TEMPLATE,
            Arc::new(probe),
            fetcher,
        )
    }
}

/// Probe answering a fixed resolution per file name
#[derive(Debug, Default)]
pub struct FakeProbe {
    /// (file name suffix, resolution); unmatched paths have no video
    pub resolutions: Vec<(String, (u32, u32))>,
    /// File name suffixes the probe rejects
    pub failing: Vec<String>,
}

impl FakeProbe {
    pub fn with(mut self, suffix: &str, resolution: (u32, u32)) -> Self {
        self.resolutions.push((suffix.to_string(), resolution));
        self
    }

    pub fn failing(mut self, suffix: &str) -> Self {
        self.failing.push(suffix.to_string());
        self
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn video_resolution(&self, path: &Path) -> Result<Option<(u32, u32)>, ProbeError> {
        let path_str = path.display().to_string();
        if self.failing.iter().any(|s| path_str.ends_with(s.as_str())) {
            return Err(ProbeError::Rejected {
                path: path_str,
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        Ok(self
            .resolutions
            .iter()
            .find(|(suffix, _)| path_str.ends_with(suffix.as_str()))
            .map(|(_, resolution)| *resolution))
    }
}

/// Fetcher writing a placeholder body; URLs containing "offline" fail
#[derive(Debug, Default)]
pub struct FakeFetcher {
    pub downloads: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        if url.contains("offline") {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(dest, b"downloaded").unwrap();
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
