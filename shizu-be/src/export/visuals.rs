//! Generic visuals pool
//!
//! Pre-recorded sets without their own visuals can borrow a stock clip. The
//! rotation cursor is owned by the caller: each pick returns the next cursor
//! so consecutive slots get different clips until the pool wraps.

use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::warn;

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "mov", "webm", "avi", "flv"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericVisuals {
    pool: Vec<PathBuf>,
}

impl GenericVisuals {
    pub fn new(mut pool: Vec<PathBuf>) -> Self {
        pool.sort();
        Self { pool }
    }

    /// Video files directly inside `dir`; a missing directory is an empty pool
    pub fn scan(dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Generic visuals directory {} unreadable: {}", dir.display(), e);
                return Self::default();
            }
        };

        let pool = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_video(path))
            .collect();
        Self::new(pool)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Random starting point for one export run
    pub fn random_cursor(&self) -> usize {
        if self.pool.is_empty() {
            0
        } else {
            rand::thread_rng().gen_range(0..self.pool.len())
        }
    }

    /// Clip at `cursor` (modulo the pool size) and the cursor for the next pick
    ///
    /// The returned cursor keeps counting up across wraps; an empty pool
    /// leaves it unchanged.
    pub fn pick(&self, cursor: usize) -> (Option<&Path>, usize) {
        if self.pool.is_empty() {
            return (None, cursor);
        }
        let index = cursor % self.pool.len();
        (Some(self.pool[index].as_path()), cursor.wrapping_add(1))
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pick_rotates_and_wraps() {
        let visuals = GenericVisuals::new(vec!["/v/b.mp4".into(), "/v/a.mp4".into()]);

        let (first, cursor) = visuals.pick(0);
        let (second, cursor) = visuals.pick(cursor);
        let (third, cursor) = visuals.pick(cursor);

        assert_eq!(first, Some(Path::new("/v/a.mp4")));
        assert_eq!(second, Some(Path::new("/v/b.mp4")));
        assert_eq!(third, first);
        assert_eq!(cursor, 3);
    }

    #[test]
    fn test_pick_cursor_wraps_at_usize_max() {
        let visuals = GenericVisuals::new(vec!["/v/a.mp4".into(), "/v/b.mp4".into()]);
        let (clip, cursor) = visuals.pick(usize::MAX);
        assert_eq!(clip, Some(Path::new("/v/b.mp4")));
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_empty_pool_picks_nothing() {
        let visuals = GenericVisuals::default();
        assert_eq!(visuals.pick(7), (None, 7));
        assert_eq!(visuals.random_cursor(), 0);
    }

    #[test]
    fn test_scan_keeps_only_videos() {
        let dir = TempDir::new().unwrap();
        for name in ["loop1.mp4", "loop2.MOV", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let visuals = GenericVisuals::scan(dir.path());
        assert_eq!(visuals.len(), 2);
        assert!(visuals.random_cursor() < 2);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let visuals = GenericVisuals::scan(Path::new("/nonexistent/generic_visuals"));
        assert!(visuals.is_empty());
    }
}
