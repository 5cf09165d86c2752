// Editor settings
// Loaded from ~/.config/gridtable/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // Borders
    #[serde(rename = "borders.defaultWidth")]
    pub border_width: String,

    #[serde(rename = "borders.defaultStyle")]
    pub border_style: String,

    #[serde(rename = "borders.defaultColor")]
    pub border_color: String,

    // Table
    #[serde(rename = "table.defaultColumnWidth")]
    pub default_column_width: String,

    // History
    #[serde(rename = "history.limit")]
    pub history_limit: usize,

    // Repair
    #[serde(rename = "repair.requireConfirmation")]
    pub repair_requires_confirmation: bool,

    // Links
    #[serde(rename = "links.openInNewTab")]
    pub links_open_in_new_tab: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            border_width: "1px".to_string(),
            border_style: "solid".to_string(),
            border_color: "#000000".to_string(),
            default_column_width: "auto".to_string(),
            history_limit: 100,
            repair_requires_confirmation: true,
            links_open_in_new_tab: false,
        }
    }
}

/// Drop `//` comment lines so the file can carry documentation.
pub(crate) fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridtable")
}

impl EditorSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`. Missing or broken files give defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {e}; using default settings", path.display());
                Self::default()
            }),
            Err(e) => {
                log::debug!("No settings at {} ({e})", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut settings: Self =
            serde_json::from_str(&strip_comments(contents)).map_err(|e| e.to_string())?;
        settings.history_limit = settings.history_limit.max(1);
        Ok(settings)
    }

    /// Save current settings to `path` (the user config dir by default)
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Link target for inserted links.
    pub fn link_target(&self) -> Option<&'static str> {
        self.links_open_in_new_tab.then_some("_blank")
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {e}");
                return;
            }
        }

        let default_config = r##"{
    // Border applied by the border picker when no style is chosen
    // Styles: "solid", "double" (legacy "plain" and "thick" are accepted)
    "borders.defaultWidth": "1px",
    "borders.defaultStyle": "solid",
    "borders.defaultColor": "#000000",

    // Width given to new columns: "auto", "120px", "25%"
    "table.defaultColumnWidth": "auto",

    // Undo steps kept per editor
    "history.limit": 100,

    // Ask before the destructive structure repair
    "repair.requireConfirmation": true,

    // Inserted links get target="_blank"
    "links.openInNewTab": false
}
"##;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {e}");
        }
    }
}
