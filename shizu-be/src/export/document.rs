//! Export document consumed by the playout tool

use serde::{Deserialize, Serialize};

/// `[width, height]`, or empty when the media has no video stream
pub type Resolution = Vec<u32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub djs: Vec<DjExport>,
    pub promos: Vec<PromoExport>,
    pub theme: ThemeExport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DjExport {
    pub name: String,
    pub logo_path: String,
    pub recording_path: String,
    pub visuals_path: String,
    pub resolution: Resolution,
    /// Live stream URL, empty for pre-recorded sets
    pub url: String,
    pub vj: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoExport {
    pub name: String,
    pub path: String,
    pub resolution: Resolution,
}

/// Unset fields are omitted, so an event without a theme exports `{}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stinger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_bgm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_offset_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_offset_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_offset_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_offset_y: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_theme_serializes_as_empty_object() {
        let doc = ExportDocument::default();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"djs": [], "promos": [], "theme": {}})
        );
    }

    #[test]
    fn test_theme_omits_unset_fields() {
        let theme = ThemeExport {
            name: Some("neon".into()),
            video_width: Some(1280),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&theme).unwrap(),
            json!({"name": "neon", "video_width": 1280})
        );
    }
}
