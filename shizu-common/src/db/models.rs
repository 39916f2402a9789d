//! Entity models and their table descriptions

use crate::db::schema::{ColumnDefinition, TableSchema};
use crate::db::store::{decode_list, Entity, SqlValue};
use crate::error::EntityKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Media root a file lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileRoot {
    Logos,
    Recordings,
    Themes,
}

impl FileRoot {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRoot::Logos => "LOGOS",
            FileRoot::Recordings => "RECORDINGS",
            FileRoot::Themes => "THEMES",
        }
    }
}

impl fmt::Display for FileRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileRoot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOGOS" => Ok(FileRoot::Logos),
            "RECORDINGS" => Ok(FileRoot::Recordings),
            "THEMES" => Ok(FileRoot::Themes),
            other => Err(Error::InvalidInput(format!(
                "Unknown file root '{}', expected LOGOS, RECORDINGS or THEMES",
                other
            ))),
        }
    }
}

/// A media file, local (relative to its root directory) and/or remote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub root: FileRoot,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub url_path: Option<String>,
}

impl TableSchema for File {
    fn table_name() -> &'static str {
        "files"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("name").not_null(),
            ColumnDefinition::text("root").not_null(),
            ColumnDefinition::text("file_path"),
            ColumnDefinition::text("url_path"),
        ]
    }
}

impl Entity for File {
    const KIND: EntityKind = EntityKind::File;

    fn key(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("root", self.root.as_str().into()),
            ("file_path", (&self.file_path).into()),
            ("url_path", (&self.url_path).into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let root: String = row.try_get("root")?;
        Ok(Self {
            name: row.try_get("name")?,
            root: root.parse()?,
            file_path: row.try_get("file_path")?,
            url_path: row.try_get("url_path")?,
        })
    }
}

/// Stream overlay package and layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub overlay_file: Option<String>,
    #[serde(default)]
    pub stinger_file: Option<String>,
    #[serde(default)]
    pub starting_file: Option<String>,
    #[serde(default)]
    pub ending_file: Option<String>,
    #[serde(default)]
    pub starting_bgm_file: Option<String>,
    #[serde(default)]
    pub target_video_width: Option<i64>,
    #[serde(default)]
    pub target_video_height: Option<i64>,
    #[serde(default)]
    pub video_offset_x: Option<i64>,
    #[serde(default)]
    pub video_offset_y: Option<i64>,
    #[serde(default)]
    pub chat_width: Option<i64>,
    #[serde(default)]
    pub chat_height: Option<i64>,
    #[serde(default)]
    pub chat_offset_x: Option<i64>,
    #[serde(default)]
    pub chat_offset_y: Option<i64>,
}

impl Theme {
    /// Columns holding file references
    pub const FILE_COLUMNS: [&'static str; 5] = [
        "overlay_file",
        "stinger_file",
        "starting_file",
        "ending_file",
        "starting_bgm_file",
    ];

    /// (column, file name) for every file reference that is set
    pub fn file_refs(&self) -> Vec<(&'static str, &str)> {
        let refs = [
            &self.overlay_file,
            &self.stinger_file,
            &self.starting_file,
            &self.ending_file,
            &self.starting_bgm_file,
        ];
        Self::FILE_COLUMNS
            .iter()
            .zip(refs)
            .filter_map(|(column, value)| value.as_deref().map(|v| (*column, v)))
            .collect()
    }
}

impl TableSchema for Theme {
    fn table_name() -> &'static str {
        "themes"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("name").not_null(),
            ColumnDefinition::text("overlay_file").references("files(name)"),
            ColumnDefinition::text("stinger_file").references("files(name)"),
            ColumnDefinition::text("starting_file").references("files(name)"),
            ColumnDefinition::text("ending_file").references("files(name)"),
            ColumnDefinition::integer("target_video_width"),
            ColumnDefinition::integer("target_video_height"),
            ColumnDefinition::integer("video_offset_x"),
            ColumnDefinition::integer("video_offset_y"),
            ColumnDefinition::integer("chat_width"),
            ColumnDefinition::integer("chat_height"),
            ColumnDefinition::integer("chat_offset_x"),
            ColumnDefinition::integer("chat_offset_y"),
            ColumnDefinition::text("starting_bgm_file").references("files(name)"),
        ]
    }
}

impl Entity for Theme {
    const KIND: EntityKind = EntityKind::Theme;

    fn key(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("overlay_file", (&self.overlay_file).into()),
            ("stinger_file", (&self.stinger_file).into()),
            ("starting_file", (&self.starting_file).into()),
            ("ending_file", (&self.ending_file).into()),
            ("target_video_width", self.target_video_width.into()),
            ("target_video_height", self.target_video_height.into()),
            ("video_offset_x", self.video_offset_x.into()),
            ("video_offset_y", self.video_offset_y.into()),
            ("chat_width", self.chat_width.into()),
            ("chat_height", self.chat_height.into()),
            ("chat_offset_x", self.chat_offset_x.into()),
            ("chat_offset_y", self.chat_offset_y.into()),
            ("starting_bgm_file", (&self.starting_bgm_file).into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            overlay_file: row.try_get("overlay_file")?,
            stinger_file: row.try_get("stinger_file")?,
            starting_file: row.try_get("starting_file")?,
            ending_file: row.try_get("ending_file")?,
            starting_bgm_file: row.try_get("starting_bgm_file")?,
            target_video_width: row.try_get("target_video_width")?,
            target_video_height: row.try_get("target_video_height")?,
            video_offset_x: row.try_get("video_offset_x")?,
            video_offset_y: row.try_get("video_offset_y")?,
            chat_width: row.try_get("chat_width")?,
            chat_height: row.try_get("chat_height")?,
            chat_offset_x: row.try_get("chat_offset_x")?,
            chat_offset_y: row.try_get("chat_offset_y")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    pub name: String,
    #[serde(default)]
    pub promo_file: Option<String>,
}

impl TableSchema for Promo {
    fn table_name() -> &'static str {
        "promos"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("name").not_null(),
            ColumnDefinition::text("promo_file").references("files(name)"),
        ]
    }
}

impl Entity for Promo {
    const KIND: EntityKind = EntityKind::Promo;

    fn key(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("promo_file", (&self.promo_file).into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            promo_file: row.try_get("promo_file")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dj {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub rtmp_server: Option<String>,
    #[serde(default)]
    pub rtmp_key: Option<String>,
    #[serde(default)]
    pub public_name: Option<String>,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub past_events: Vec<String>,
}

impl Dj {
    /// Name shown on stream: public name when set
    pub fn display_name(&self) -> &str {
        match self.public_name.as_deref() {
            Some(public) if !public.is_empty() => public,
            _ => &self.name,
        }
    }
}

impl TableSchema for Dj {
    fn table_name() -> &'static str {
        "djs"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("name").not_null(),
            ColumnDefinition::text("logo").references("files(name)"),
            ColumnDefinition::text("rtmp_server"),
            ColumnDefinition::text("rtmp_key"),
            ColumnDefinition::text("public_name"),
            ColumnDefinition::text("discord_id"),
            ColumnDefinition::text("past_events").not_null().default("'[]'"),
        ]
    }
}

impl Entity for Dj {
    const KIND: EntityKind = EntityKind::Dj;

    fn key(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("logo", (&self.logo).into()),
            ("rtmp_server", (&self.rtmp_server).into()),
            ("rtmp_key", (&self.rtmp_key).into()),
            ("public_name", (&self.public_name).into()),
            ("discord_id", (&self.discord_id).into()),
            ("past_events", (&self.past_events).into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            logo: row.try_get("logo")?,
            rtmp_server: row.try_get("rtmp_server")?,
            rtmp_key: row.try_get("rtmp_key")?,
            public_name: row.try_get("public_name")?,
            discord_id: row.try_get("discord_id")?,
            past_events: decode_list(row, "past_events")?,
        })
    }
}

/// An event row; the DJ lineup lives in `event_djs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    /// Promo lineup, array index is the slot position
    #[serde(default)]
    pub promos: Vec<String>,
    #[serde(default)]
    pub theme: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM`
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub public: bool,
}

impl TableSchema for Event {
    fn table_name() -> &'static str {
        "events"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("name").not_null(),
            ColumnDefinition::text("promos").not_null().default("'[]'"),
            ColumnDefinition::text("theme").references("themes(name)"),
            ColumnDefinition::text("date"),
            ColumnDefinition::text("start_time"),
            ColumnDefinition::integer("public").not_null().default("0"),
        ]
    }
}

impl Entity for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn key(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("promos", (&self.promos).into()),
            ("theme", (&self.theme).into()),
            ("date", (&self.date).into()),
            ("start_time", (&self.start_time).into()),
            ("public", self.public.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            promos: decode_list(row, "promos")?,
            theme: row.try_get("theme")?,
            date: row.try_get("date")?,
            start_time: row.try_get("start_time")?,
            public: row.try_get("public")?,
        })
    }

    fn order_by() -> &'static str {
        "date IS NULL, date DESC, start_time DESC, name ASC"
    }
}

/// A DJ's slot in an event lineup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDj {
    pub event: String,
    pub dj: String,
    pub position: i64,
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

impl TableSchema for EventDj {
    fn table_name() -> &'static str {
        "event_djs"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::text("event").not_null().references("events(name)"),
            ColumnDefinition::text("dj").not_null().references("djs(name)"),
            ColumnDefinition::integer("position").not_null(),
            ColumnDefinition::integer("is_live").not_null().default("0"),
            ColumnDefinition::text("vj"),
            ColumnDefinition::text("recording").references("files(name)"),
            ColumnDefinition::text("visuals").references("files(name)"),
            ColumnDefinition::integer("use_generic_visuals").not_null().default("0"),
        ]
    }

    fn key_columns() -> &'static [&'static str] {
        &["event", "dj"]
    }
}

impl Entity for EventDj {
    const KIND: EntityKind = EntityKind::DjSlot;

    fn key(&self) -> Vec<&str> {
        vec![self.event.as_str(), self.dj.as_str()]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("event", self.event.as_str().into()),
            ("dj", self.dj.as_str().into()),
            ("position", Some(self.position).into()),
            ("is_live", self.is_live.into()),
            ("vj", (&self.vj).into()),
            ("recording", (&self.recording).into()),
            ("visuals", (&self.visuals).into()),
            ("use_generic_visuals", self.use_generic_visuals.into()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            event: row.try_get("event")?,
            dj: row.try_get("dj")?,
            position: row.try_get("position")?,
            is_live: row.try_get("is_live")?,
            vj: row.try_get("vj")?,
            recording: row.try_get("recording")?,
            visuals: row.try_get("visuals")?,
            use_generic_visuals: row.try_get("use_generic_visuals")?,
        })
    }

    fn order_by() -> &'static str {
        "event, position"
    }
}
