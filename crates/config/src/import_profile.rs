// Import profile
// Loaded from ~/.config/gridtable/import.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::config_dir;

/// How delimited text and spreadsheets are turned into tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportProfile {
    /// "auto" to sniff, otherwise a single character ("," ";" "\t" "|").
    pub delimiter: String,
    /// Render the first row bold.
    pub header_row: bool,
    /// Trim whitespace around every value.
    pub trim: bool,
    /// Stop after this many rows (0 = no limit).
    pub max_rows: usize,
    /// Spreadsheet sheet to import; first sheet when empty.
    pub sheet: String,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            delimiter: "auto".to_string(),
            header_row: false,
            trim: true,
            max_rows: 0,
            sheet: String::new(),
        }
    }
}

impl ImportProfile {
    pub fn config_path() -> PathBuf {
        config_dir().join("import.toml")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {e}; using default import profile", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn to_toml_string(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Explicit delimiter byte, or None to sniff.
    pub fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_str() {
            "" | "auto" => None,
            "\\t" | "tab" => Some(b'\t'),
            other => other.bytes().next(),
        }
    }

    pub fn row_limit(&self) -> Option<usize> {
        (self.max_rows > 0).then_some(self.max_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_profile() {
        let profile = ImportProfile::from_toml_str("delimiter = \";\"\nheader_row = true\n").unwrap();
        assert_eq!(profile.delimiter_byte(), Some(b';'));
        assert!(profile.header_row);
        assert!(profile.trim);
        assert_eq!(profile.row_limit(), None);
    }

    #[test]
    fn test_tab_spellings() {
        for spelling in ["\\t", "tab", "\t"] {
            let profile = ImportProfile { delimiter: spelling.to_string(), ..ImportProfile::default() };
            assert_eq!(profile.delimiter_byte(), Some(b'\t'));
        }
        assert_eq!(ImportProfile::default().delimiter_byte(), None);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.toml");
        let profile = ImportProfile { max_rows: 50, sheet: "Data".into(), ..ImportProfile::default() };
        fs::write(&path, profile.to_toml_string().unwrap()).unwrap();
        assert_eq!(ImportProfile::load_from(&path), profile);
    }

    #[test]
    fn test_invalid_toml_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.toml");
        fs::write(&path, "max_rows = \"many\"").unwrap();
        assert_eq!(ImportProfile::load_from(&path), ImportProfile::default());
    }
}
