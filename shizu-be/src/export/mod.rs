//! Event export
//!
//! Turns one event into the JSON document the playout tool reads: every
//! referenced file is made available locally (downloading it when needed),
//! video resolutions are probed, and the result is written to the export
//! directory. Nothing is written unless every file and every probe succeeded.

pub mod document;
pub mod fetch;
pub mod media;
pub mod visuals;

pub use document::{DjExport, ExportDocument, PromoExport, ThemeExport};
pub use fetch::{FetchError, HttpFetcher, RemoteFetcher};
pub use media::{FfprobeProbe, MediaProbe, ProbeError};
pub use visuals::GenericVisuals;

use crate::lineup::dj_slots;
use crate::validate;
use shizu_common::config::MediaRoots;
use shizu_common::db::models::{Dj, Event, EventDj, File, Promo, Theme};
use shizu_common::db::store;
use shizu_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Live stream URL for a DJ's RTMP server and stream key
pub fn format_rtmp_url(template: &str, server: &str, key: &str) -> String {
    template.replace("{server}", server).replace("{key}", key)
}

/// Local file name for a remote file: last URL path segment, percent-decoded
///
/// `None` when the URL has no path or the decoded segment is not a plain
/// file name (separators, `.` or `..`).
pub(crate) fn url_basename(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.split_once("://") {
        Some((_, rest)) => &rest[rest.find('/')?..],
        None => without_query,
    };
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let segment = trimmed.rsplit('/').next()?;
    let decoded = urlencoding::decode(segment).ok()?;
    if validate::is_plain_file_name(&decoded) {
        Some(decoded.into_owned())
    } else {
        None
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Everything a slot contributes to the export, resolved from the store
struct SlotSource {
    slot: EventDj,
    dj: Dj,
}

pub struct ExportAssembler {
    db: SqlitePool,
    roots: MediaRoots,
    rtmp_template: String,
    probe: Arc<dyn MediaProbe>,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl ExportAssembler {
    pub fn new(
        db: SqlitePool,
        roots: MediaRoots,
        rtmp_template: impl Into<String>,
        probe: Arc<dyn MediaProbe>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        Self {
            db,
            roots,
            rtmp_template: rtmp_template.into(),
            probe,
            fetcher,
        }
    }

    /// Export an event, starting the generic visuals rotation at a random clip
    pub async fn export_event(&self, name: &str) -> Result<ExportDocument> {
        let visuals = GenericVisuals::scan(&self.roots.generic_visuals);
        let cursor = visuals.random_cursor();
        let (document, _) = self.assemble(name, &visuals, cursor).await?;
        Ok(document)
    }

    /// Export an event with an explicit rotation cursor; returns the cursor
    /// after the last generic clip handed out
    pub async fn export_event_with_cursor(
        &self,
        name: &str,
        cursor: usize,
    ) -> Result<(ExportDocument, usize)> {
        let visuals = GenericVisuals::scan(&self.roots.generic_visuals);
        self.assemble(name, &visuals, cursor).await
    }

    async fn assemble(
        &self,
        name: &str,
        visuals: &GenericVisuals,
        mut cursor: usize,
    ) -> Result<(ExportDocument, usize)> {
        let mut conn = self.db.acquire().await?;
        let event: Event = store::fetch(&mut conn, &[name]).await?;
        let mut failures = Vec::new();

        let theme = self.load_theme(&mut conn, &event).await;

        let mut promos = Vec::new();
        for promo_name in &event.promos {
            match store::get::<Promo>(&mut conn, &[promo_name.as_str()]).await? {
                Some(promo) if non_empty(promo.promo_file.as_deref()).is_some() => promos.push(promo),
                Some(_) => failures.push(format!("Promo {} has no file", promo_name)),
                None => failures.push(format!("Promo {} does not exist", promo_name)),
            }
        }

        let mut slots = Vec::new();
        for slot in dj_slots::list(&mut conn, name).await? {
            match store::get::<Dj>(&mut conn, &[slot.dj.as_str()]).await? {
                Some(dj) => slots.push(SlotSource { slot, dj }),
                None => failures.push(format!("DJ {} does not exist", slot.dj)),
            }
        }

        let file_names = referenced_files(theme.as_ref(), &promos, &slots);
        let mut local_paths: HashMap<String, PathBuf> = HashMap::new();
        for file_name in file_names {
            let file = match store::get::<File>(&mut conn, &[file_name.as_str()]).await? {
                Some(file) => file,
                None => {
                    failures.push(format!("File {} does not exist", file_name));
                    continue;
                }
            };
            match self.ensure_local(&mut conn, &file).await {
                Ok(path) => {
                    local_paths.insert(file_name, path);
                }
                Err(Error::InvalidFile(messages)) => failures.extend(messages),
                Err(e) => return Err(e),
            }
        }

        if !failures.is_empty() {
            warn!("Export of {} aborted: {} file problem(s)", name, failures.len());
            return Err(Error::InvalidFile(failures));
        }

        let path_of = |file: Option<&str>| -> String {
            file.and_then(|f| local_paths.get(f))
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        let mut probe_failures = Vec::new();

        let mut djs = Vec::with_capacity(slots.len());
        for SlotSource { slot, dj } in &slots {
            let mut record = DjExport {
                name: dj.display_name().to_string(),
                logo_path: path_of(dj.logo.as_deref()),
                vj: slot.vj.clone().unwrap_or_default(),
                ..Default::default()
            };

            if slot.is_live {
                record.url = format_rtmp_url(
                    &self.rtmp_template,
                    dj.rtmp_server.as_deref().unwrap_or_default(),
                    dj.rtmp_key.as_deref().unwrap_or_default(),
                );
            } else {
                record.recording_path = path_of(slot.recording.as_deref());
                record.visuals_path = if slot.visuals.is_some() {
                    path_of(slot.visuals.as_deref())
                } else if slot.use_generic_visuals {
                    let (clip, next) = visuals.pick(cursor);
                    cursor = next;
                    clip.map(|p| p.display().to_string()).unwrap_or_default()
                } else {
                    String::new()
                };

                let target = if record.visuals_path.is_empty() {
                    &record.recording_path
                } else {
                    &record.visuals_path
                };
                let probed = self.resolution(target).await;
                match probed {
                    Ok(resolution) => record.resolution = resolution,
                    Err(e) => probe_failures.push(format!("DJ {}: {}", dj.name, e)),
                }
            }
            djs.push(record);
        }

        let mut promo_records = Vec::with_capacity(promos.len());
        for promo in &promos {
            let path = path_of(promo.promo_file.as_deref());
            match self.resolution(&path).await {
                Ok(resolution) => promo_records.push(PromoExport {
                    name: promo.name.clone(),
                    path,
                    resolution,
                }),
                Err(e) => probe_failures.push(format!("Promo {}: {}", promo.name, e)),
            }
        }

        if !probe_failures.is_empty() {
            warn!(
                "Export of {} aborted: {} probe failure(s)",
                name,
                probe_failures.len()
            );
            return Err(Error::ExportFailure(probe_failures));
        }

        let optional_path = |file: Option<&str>| -> Option<String> {
            let path = path_of(file);
            (!path.is_empty()).then_some(path)
        };
        let theme = theme
            .map(|theme| ThemeExport {
                overlay: optional_path(theme.overlay_file.as_deref()),
                starting: optional_path(theme.starting_file.as_deref()),
                stinger: optional_path(theme.stinger_file.as_deref()),
                ending: optional_path(theme.ending_file.as_deref()),
                starting_bgm: optional_path(theme.starting_bgm_file.as_deref()),
                video_width: theme.target_video_width,
                video_height: theme.target_video_height,
                video_offset_x: theme.video_offset_x,
                video_offset_y: theme.video_offset_y,
                chat_width: theme.chat_width,
                chat_height: theme.chat_height,
                chat_offset_x: theme.chat_offset_x,
                chat_offset_y: theme.chat_offset_y,
                name: Some(theme.name),
            })
            .unwrap_or_default();

        let document = ExportDocument {
            djs,
            promos: promo_records,
            theme,
        };
        let written = self.write_document(name, &document).await?;
        info!(
            "Exported {} to {} ({} DJs, {} promos)",
            name,
            written.display(),
            document.djs.len(),
            document.promos.len()
        );
        Ok((document, cursor))
    }

    async fn load_theme(&self, conn: &mut SqliteConnection, event: &Event) -> Option<Theme> {
        let theme_name = event.theme.as_deref()?;
        match store::get::<Theme>(conn, &[theme_name]).await {
            Ok(Some(theme)) => Some(theme),
            Ok(None) => {
                warn!("Theme {} of event {} not found, exporting without theme", theme_name, event.name);
                None
            }
            Err(e) => {
                warn!("Theme {} of event {} could not be loaded: {}", theme_name, event.name, e);
                None
            }
        }
    }

    /// Local path of `file`, downloading it first when it is only remote
    ///
    /// Collectable problems come back as a single-entry `InvalidFile`.
    async fn ensure_local(&self, conn: &mut SqliteConnection, file: &File) -> Result<PathBuf> {
        let file_path = non_empty(file.file_path.as_deref());
        let url = non_empty(file.url_path.as_deref());

        let relative = match (file_path, url) {
            (Some(path), _) => path.to_string(),
            (None, Some(url)) => url_basename(url).ok_or_else(|| {
                Error::InvalidFile(vec![format!(
                    "File {}: cannot derive a file name from {}",
                    file.name, url
                )])
            })?,
            (None, None) => {
                return Err(Error::InvalidFile(vec![format!(
                    "File {} has neither a path nor a URL",
                    file.name
                )]))
            }
        };

        if !validate::is_contained_path(&relative) {
            return Err(Error::InvalidFile(vec![format!(
                "File {}: path {} leaves its media root",
                file.name, relative
            )]));
        }

        let local = self.roots.dir(file.root).join(&relative);
        if local.exists() {
            return Ok(local);
        }

        let url = url.ok_or_else(|| {
            Error::InvalidFile(vec![format!(
                "File {} is missing at {} and has no URL",
                file.name,
                local.display()
            )])
        })?;

        self.fetcher.download(url, &local).await.map_err(|e| {
            Error::InvalidFile(vec![format!("File {}: download failed: {}", file.name, e)])
        })?;
        debug!("Downloaded {} to {}", file.name, local.display());

        if file_path.is_none() {
            let mut updated = file.clone();
            updated.file_path = Some(relative);
            store::update(conn, &updated).await?;
            info!("Recorded local path for {}", file.name);
        }
        Ok(local)
    }

    async fn resolution(&self, path: &str) -> std::result::Result<Vec<u32>, ProbeError> {
        if path.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .probe
            .video_resolution(Path::new(path))
            .await?
            .map(|(w, h)| vec![w, h])
            .unwrap_or_default())
    }

    async fn write_document(&self, name: &str, document: &ExportDocument) -> Result<PathBuf> {
        validate::check_event_name(name)?;
        tokio::fs::create_dir_all(&self.roots.export).await?;
        let path = self.roots.export.join(format!("{}.json", name));
        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

/// File names referenced by the export, first occurrence first
fn referenced_files(theme: Option<&Theme>, promos: &[Promo], slots: &[SlotSource]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: Option<&str>| {
        if let Some(name) = non_empty(name) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    };

    if let Some(theme) = theme {
        for (_, file) in theme.file_refs() {
            push(Some(file));
        }
    }
    for promo in promos {
        push(promo.promo_file.as_deref());
    }
    for SlotSource { slot, dj } in slots {
        push(dj.logo.as_deref());
        if !slot.is_live {
            push(slot.recording.as_deref());
            push(slot.visuals.as_deref());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtmp_url_substitution() {
        assert_eq!(
            format_rtmp_url("rtmp://{server}/live/{key}", "eu.ingest.example", "abc123"),
            "rtmp://eu.ingest.example/live/abc123"
        );
    }

    #[test]
    fn test_url_basename_decodes() {
        assert_eq!(
            url_basename("https://files.example/sets/Night%20Drive.mp4?token=1").as_deref(),
            Some("Night Drive.mp4")
        );
        assert_eq!(url_basename("https://files.example/"), None);
        assert_eq!(url_basename("https://files.example"), None);
        assert_eq!(url_basename("https://files.example?x=1"), None);
        assert_eq!(url_basename("https://files.example/sets/").as_deref(), Some("sets"));
    }

    #[test]
    fn test_url_basename_rejects_encoded_traversal() {
        assert_eq!(url_basename("https://files.example/..%2F..%2Fx.mp4"), None);
        assert_eq!(url_basename("https://files.example/a/%2E%2E"), None);
        assert_eq!(url_basename("https://files.example/a%5Cb.mp4"), None);
    }

    #[test]
    fn test_referenced_files_dedup_in_order() {
        let theme = Theme {
            name: "neon".into(),
            overlay_file: Some("overlay".into()),
            starting_bgm_file: Some("bgm".into()),
            ..Default::default()
        };
        let promos = vec![Promo {
            name: "summer".into(),
            promo_file: Some("overlay".into()),
        }];
        let slots = vec![
            SlotSource {
                slot: EventDj {
                    dj: "alice".into(),
                    is_live: true,
                    recording: Some("ignored".into()),
                    ..Default::default()
                },
                dj: Dj {
                    name: "alice".into(),
                    logo: Some("alice_logo".into()),
                    ..Default::default()
                },
            },
            SlotSource {
                slot: EventDj {
                    dj: "bob".into(),
                    recording: Some("bob_set".into()),
                    visuals: Some("bob_vis".into()),
                    ..Default::default()
                },
                dj: Dj {
                    name: "bob".into(),
                    ..Default::default()
                },
            },
        ];

        assert_eq!(
            referenced_files(Some(&theme), &promos, &slots),
            vec!["overlay", "bgm", "alice_logo", "bob_set", "bob_vis"]
        );
    }
}
