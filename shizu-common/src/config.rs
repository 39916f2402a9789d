//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file; every field has a
//! built-in default so a missing file is not an error. Media directories and
//! stream settings can be overridden per deployment through environment
//! variables.
//!
//! Root folder priority:
//! 1. Command-line argument
//! 2. Environment variable (`SHIZU_ROOT_FOLDER`)
//! 3. TOML `root_folder`
//! 4. OS-dependent default

use crate::db::models::FileRoot;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ROOT_FOLDER_ENV: &str = "SHIZU_ROOT_FOLDER";
pub const CONFIG_ENV: &str = "SHIZU_CONFIG";
pub const DATABASE_FILE: &str = "shizu.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            media: MediaConfig::default(),
            stream: StreamConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Media directories; relative paths are resolved against the root folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_logos_dir")]
    pub logos: PathBuf,
    #[serde(default = "default_recordings_dir")]
    pub recordings: PathBuf,
    #[serde(default = "default_themes_dir")]
    pub themes: PathBuf,
    #[serde(default = "default_export_dir")]
    pub export: PathBuf,
    #[serde(default = "default_generic_visuals_dir")]
    pub generic_visuals: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            logos: default_logos_dir(),
            recordings: default_recordings_dir(),
            themes: default_themes_dir(),
            export: default_export_dir(),
            generic_visuals: default_generic_visuals_dir(),
        }
    }
}

/// A named ingest point offered to DJs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtmpZone {
    pub name: String,
    pub server: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Live stream URL template, `{server}` and `{key}` are substituted
    #[serde(default = "default_rtmp_template")]
    pub rtmp_template: String,
    #[serde(default)]
    pub rtmp_zones: Vec<RtmpZone>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            rtmp_template: default_rtmp_template(),
            rtmp_zones: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// HTTP basic auth for the file server, `user:password`
    #[serde(default)]
    pub authorization: Option<String>,
    /// Per-download timeout; unset means downloads may take as long as needed
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5740
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_logos_dir() -> PathBuf {
    PathBuf::from("logos")
}

fn default_recordings_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_themes_dir() -> PathBuf {
    PathBuf::from("themes")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("export")
}

fn default_generic_visuals_dir() -> PathBuf {
    PathBuf::from("generic_visuals")
}

fn default_rtmp_template() -> String {
    "rtmp://{server}/live/{key}".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicitly named file must exist. Otherwise the platform config
    /// locations are tried and built-in defaults are used when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => default_config_file(),
        };

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables take precedence over file values
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut PathBuf); 5] = [
            ("SHIZU_LOGOS_PATH", &mut self.media.logos),
            ("SHIZU_RECORDINGS_PATH", &mut self.media.recordings),
            ("SHIZU_THEMES_PATH", &mut self.media.themes),
            ("SHIZU_EXPORT_PATH", &mut self.media.export),
            ("SHIZU_GENERIC_VISUALS_PATH", &mut self.media.generic_visuals),
        ];
        for (var, target) in overrides {
            if let Ok(value) = std::env::var(var) {
                *target = PathBuf::from(value);
            }
        }

        if let Ok(template) = std::env::var("SHIZU_RTMP_TEMPLATE") {
            self.stream.rtmp_template = template;
        }
        if let Ok(auth) = std::env::var("SHIZU_FILE_SERVER_AUTH") {
            self.download.authorization = Some(auth);
        }
    }
}

/// Absolute media directories
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRoots {
    pub logos: PathBuf,
    pub recordings: PathBuf,
    pub themes: PathBuf,
    pub export: PathBuf,
    pub generic_visuals: PathBuf,
}

impl MediaRoots {
    pub fn resolve(media: &MediaConfig, root_folder: &Path) -> Self {
        let absolute = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root_folder.join(p)
            }
        };
        Self {
            logos: absolute(&media.logos),
            recordings: absolute(&media.recordings),
            themes: absolute(&media.themes),
            export: absolute(&media.export),
            generic_visuals: absolute(&media.generic_visuals),
        }
    }

    /// Directory a file's relative path is resolved against
    pub fn dir(&self, root: FileRoot) -> &Path {
        match root {
            FileRoot::Logos => &self.logos,
            FileRoot::Recordings => &self.recordings,
            FileRoot::Themes => &self.themes,
        }
    }

    /// Create every directory that does not exist yet
    pub fn ensure_exist(&self) -> Result<()> {
        for dir in [
            &self.logos,
            &self.recordings,
            &self.themes,
            &self.export,
            &self.generic_visuals,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Resolve the root folder (CLI > environment > TOML > OS default)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// `<root>/shizu.db`
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("shizu").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/shizu/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("shizu"))
        .unwrap_or_else(|| PathBuf::from("./shizu_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, 5740);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.media.recordings, PathBuf::from("recordings"));
        assert_eq!(config.stream.rtmp_template, "rtmp://{server}/live/{key}");
        assert!(config.download.timeout_secs.is_none());
    }

    #[test]
    fn test_media_roots_resolve_relative_against_root() {
        let media = MediaConfig {
            export: PathBuf::from("/srv/export"),
            ..MediaConfig::default()
        };
        let roots = MediaRoots::resolve(&media, Path::new("/data/shizu"));
        assert_eq!(roots.logos, PathBuf::from("/data/shizu/logos"));
        assert_eq!(roots.export, PathBuf::from("/srv/export"));
        assert_eq!(roots.dir(FileRoot::Themes), Path::new("/data/shizu/themes"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
