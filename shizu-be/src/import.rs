//! Legacy data import
//!
//! Reads the ledger and per-event lineup files of the previous show tooling.
//! Every record is attempted; failures are collected and reported together
//! once the whole input has been processed.

use crate::catalog::{djs, events, files, promos};
use crate::export::url_basename;
use crate::lineup::{LineupManager, NewDjSlot};
use serde::Deserialize;
use shizu_common::config::MediaRoots;
use shizu_common::db::models::{Dj, File, FileRoot, Promo};
use shizu_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct LegacyLedger {
    #[serde(default)]
    djs: Vec<LegacyDj>,
    #[serde(default)]
    promos: Vec<LegacyPromo>,
}

#[derive(Debug, Deserialize)]
struct LegacyDj {
    name: String,
    #[serde(default)]
    logo_path: Option<String>,
    #[serde(default)]
    recording_path: Option<String>,
    #[serde(default)]
    rtmp_server: Option<String>,
    #[serde(default)]
    stream_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyPromo {
    name: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyLineup {
    #[serde(default)]
    djs: Vec<LegacyLineupDj>,
    #[serde(default)]
    promos: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyLineupDj {
    name: String,
    #[serde(default)]
    is_live: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    recording_path: Option<String>,
    #[serde(default)]
    vj: Option<String>,
}

/// Basename -> path relative to the indexed root
#[derive(Debug, Default)]
struct FileIndex {
    entries: HashMap<String, PathBuf>,
}

impl FileIndex {
    fn build(root: &Path) -> Self {
        let mut entries = HashMap::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let basename = entry.file_name().to_string_lossy().to_string();
            entries.entry(basename).or_insert_with(|| relative.to_path_buf());
        }
        debug!("Indexed {} file(s) under {}", entries.len(), root.display());
        Self { entries }
    }

    /// File record for a legacy path, named after its stem
    fn lookup(&self, legacy_path: &str, root: FileRoot) -> Option<File> {
        let legacy = Path::new(legacy_path);
        let basename = legacy.file_name()?.to_string_lossy();
        let relative = self.entries.get(basename.as_ref())?;
        let stem = legacy.file_stem()?.to_string_lossy().to_string();
        Some(File {
            name: stem,
            root,
            file_path: Some(relative.to_string_lossy().to_string()),
            url_path: None,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn finish(kind: &str, failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        info!("{} import complete", kind);
        Ok(())
    } else {
        warn!("{} import finished with {} failure(s)", kind, failures.len());
        Err(Error::ImportFailure(failures))
    }
}

#[derive(Clone)]
pub struct LegacyImporter {
    db: SqlitePool,
    roots: MediaRoots,
    lineup: LineupManager,
}

impl LegacyImporter {
    pub fn new(db: SqlitePool, roots: MediaRoots) -> Self {
        let lineup = LineupManager::new(db.clone());
        Self { db, roots, lineup }
    }

    /// Import DJs, promos and their files from a legacy ledger
    pub async fn import_ledger(&self, path: &Path) -> Result<()> {
        let ledger: LegacyLedger = read_json(path)?;
        info!(
            "Importing ledger {} ({} DJs, {} promos)",
            path.display(),
            ledger.djs.len(),
            ledger.promos.len()
        );

        let logos = FileIndex::build(&self.roots.logos);
        let recordings = FileIndex::build(&self.roots.recordings);

        let mut new_files = Vec::new();
        let mut new_djs = Vec::new();
        let mut new_promos = Vec::new();
        let mut dj_recordings = Vec::new();

        for legacy in ledger.djs {
            if let Some(recording_path) = legacy.recording_path.clone() {
                dj_recordings.push((legacy.name.clone(), recording_path));
            }
            let mut dj = Dj {
                name: legacy.name,
                rtmp_server: legacy.rtmp_server,
                rtmp_key: legacy.stream_key,
                ..Default::default()
            };
            if let Some(logo_path) = legacy.logo_path.as_deref() {
                match logos.lookup(logo_path, FileRoot::Logos) {
                    Some(file) => {
                        dj.logo = Some(file.name.clone());
                        new_files.push(file);
                    }
                    None => warn!("Logo {} of DJ {} not found under logos", logo_path, dj.name),
                }
            }
            new_djs.push(dj);
        }

        for legacy in ledger.promos {
            let mut promo = Promo {
                name: legacy.name,
                promo_file: None,
            };
            if let Some(promo_path) = legacy.path.as_deref() {
                match recordings.lookup(promo_path, FileRoot::Recordings) {
                    Some(file) => {
                        promo.promo_file = Some(file.name.clone());
                        new_files.push(file);
                    }
                    None => warn!("File {} of promo {} not found under recordings", promo_path, promo.name),
                }
            }
            new_promos.push(promo);
        }

        let mut failures = Vec::new();
        for file in &new_files {
            if let Err(e) = files::create_file(&self.db, file).await {
                failures.push(format!("Failed to import file {}: {}", file.name, e));
            }
        }
        for dj in &new_djs {
            if let Err(e) = djs::create_dj(&self.db, dj).await {
                failures.push(format!("Failed to import DJ {}: {}", dj.name, e));
            }
        }
        for promo in &new_promos {
            if let Err(e) = promos::create_promo(&self.db, promo).await {
                failures.push(format!("Failed to import promo {}: {}", promo.name, e));
            }
        }
        for (dj, recording_path) in &dj_recordings {
            if let Err(e) = self.recording_file(&recordings, Some(recording_path), None).await {
                failures.push(format!("Failed to import recording of DJ {}: {}", dj, e));
            }
        }

        finish("Ledger", failures)
    }

    /// Create one event per lineup file in `dir`, named after the file stem
    pub async fn import_lineups(&self, dir: &Path) -> Result<()> {
        let mut lineup_files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        lineup_files.sort();
        info!("Importing {} lineup(s) from {}", lineup_files.len(), dir.display());

        let recordings = FileIndex::build(&self.roots.recordings);
        let mut failures = Vec::new();

        for path in lineup_files {
            let Some(event_name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let lineup: LegacyLineup = match read_json(&path) {
                Ok(lineup) => lineup,
                Err(e) => {
                    failures.push(format!("Failed to read lineup {}: {}", path.display(), e));
                    continue;
                }
            };

            let new_event = events::NewEvent {
                name: event_name.clone(),
                ..Default::default()
            };
            if let Err(e) = events::create_event(&self.db, new_event).await {
                failures.push(format!("Failed to import event {}: {}", event_name, e));
                continue;
            }

            for legacy in &lineup.djs {
                let mut slot = NewDjSlot {
                    dj: legacy.name.clone(),
                    is_live: legacy.is_live,
                    vj: legacy.vj.clone().filter(|vj| !vj.is_empty()),
                    ..Default::default()
                };
                if !legacy.is_live {
                    let recording_path = legacy.recording_path.as_deref().filter(|p| !p.is_empty());
                    let url = legacy.url.as_deref().filter(|u| !u.is_empty());
                    match self.recording_file(&recordings, recording_path, url).await {
                        Ok(name) => slot.recording = name,
                        Err(e) => failures.push(format!(
                            "Failed to import recording of {} for {}: {}",
                            legacy.name, event_name, e
                        )),
                    }
                }
                if let Err(e) = self.lineup.append_dj(&event_name, &slot).await {
                    failures.push(format!("Failed to add DJ {} to {}: {}", legacy.name, event_name, e));
                }
            }

            for promo in &lineup.promos {
                if let Err(e) = self.lineup.append_promo(&event_name, promo).await {
                    failures.push(format!("Failed to add promo {} to {}: {}", promo, event_name, e));
                }
            }
            debug!("Imported lineup {}", event_name);
        }

        finish("Lineup", failures)
    }

    /// Name of the RECORDINGS file for a legacy recording, registering it when new
    ///
    /// A recording found under the recordings root is registered with its
    /// local path. Otherwise a download URL, when given, becomes a remote
    /// file that the exporter fetches on demand.
    async fn recording_file(
        &self,
        index: &FileIndex,
        legacy_path: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<String>> {
        let local = legacy_path.and_then(|path| index.lookup(path, FileRoot::Recordings));
        let file = match (local, url) {
            (Some(file), _) => file,
            (None, Some(url)) => {
                let Some(name) = remote_file_name(legacy_path, url) else {
                    warn!("Cannot derive a file name for recording {}", url);
                    return Ok(None);
                };
                File {
                    name,
                    root: FileRoot::Recordings,
                    file_path: None,
                    url_path: Some(url.to_string()),
                }
            }
            (None, None) => {
                if let Some(path) = legacy_path {
                    warn!("Recording {} not found under recordings", path);
                }
                return Ok(None);
            }
        };
        match files::create_file(&self.db, &file).await {
            Ok(()) | Err(Error::AlreadyExists { .. }) => Ok(Some(file.name)),
            Err(e) => Err(e),
        }
    }
}

/// Stem of the legacy path, or of the URL's last segment
fn remote_file_name(legacy_path: Option<&str>, url: &str) -> Option<String> {
    let basename = match legacy_path {
        Some(path) => Path::new(path).file_name()?.to_string_lossy().to_string(),
        None => url_basename(url)?,
    };
    let stem = Path::new(&basename).file_stem()?.to_string_lossy().to_string();
    Some(stem).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_matches_by_basename_in_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2024/spring")).unwrap();
        std::fs::write(dir.path().join("2024/spring/alice.png"), b"png").unwrap();

        let index = FileIndex::build(dir.path());
        let file = index.lookup("/old/logos/alice.png", FileRoot::Logos).unwrap();

        assert_eq!(file.name, "alice");
        assert_eq!(file.root, FileRoot::Logos);
        assert_eq!(
            file.file_path.as_deref().map(Path::new),
            Some(Path::new("2024/spring/alice.png"))
        );
        assert!(index.lookup("/old/logos/bob.png", FileRoot::Logos).is_none());
    }

    #[test]
    fn test_remote_file_name_prefers_legacy_path() {
        assert_eq!(
            remote_file_name(Some("D:/sets/alice_set.mp4"), "https://cdn.example/x.mp4"),
            Some("alice_set".to_string())
        );
        assert_eq!(
            remote_file_name(None, "https://cdn.example/sets/bob.mp4?dl=1"),
            Some("bob".to_string())
        );
    }

    #[test]
    fn test_ledger_tolerates_missing_sections() {
        let ledger: LegacyLedger = serde_json::from_str(r#"{"djs": [{"name": "alice"}]}"#).unwrap();
        assert_eq!(ledger.djs.len(), 1);
        assert!(ledger.promos.is_empty());
    }
}
