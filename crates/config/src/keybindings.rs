// Keybinding configuration
// Loaded from ~/.config/gridtable/keybindings.json

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::{config_dir, strip_comments};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybinding {
    pub key: String,
    pub command: String,
    /// Edit-mode context: "editing" or "locked". None applies in both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
}

impl Keybinding {
    fn new(key: &str, command: &str, when: Option<&str>) -> Self {
        Self { key: key.into(), command: command.into(), when: when.map(Into::into) }
    }
}

#[derive(Debug, Clone)]
pub struct Keybindings {
    // (normalized key combo, context) -> command name
    bindings: HashMap<(String, Option<String>), String>,
    // command name -> key combo (for display)
    shortcuts: HashMap<String, String>,
}

impl Default for Keybindings {
    fn default() -> Self {
        let mut manager = Self { bindings: HashMap::new(), shortcuts: HashMap::new() };
        manager.extend(default_keybindings());
        manager
    }
}

impl Keybindings {
    pub fn config_path() -> PathBuf {
        config_dir().join("keybindings.json")
    }

    /// Defaults overlaid with the user's file, if any.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let mut manager = Self::default();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(user) => manager.extend(user),
                Err(e) => log::warn!("Error parsing {}: {e}", path.display()),
            },
            Err(e) => log::debug!("No keybindings at {} ({e})", path.display()),
        }
        manager
    }

    pub fn parse(contents: &str) -> Result<Vec<Keybinding>, String> {
        serde_json::from_str(&strip_comments(contents)).map_err(|e| e.to_string())
    }

    /// Add bindings; later ones override earlier ones for the same chord.
    pub fn extend(&mut self, bindings: impl IntoIterator<Item = Keybinding>) {
        for binding in bindings {
            let key = normalize_key(&binding.key);
            self.shortcuts.insert(binding.command.clone(), binding.key.clone());
            self.bindings.insert((key, binding.when), binding.command);
        }
    }

    /// Command for a key chord. A binding for `context` wins over a
    /// context-free one.
    pub fn command_for(&self, key: &str, context: Option<&str>) -> Option<&str> {
        let key = normalize_key(key);
        context
            .and_then(|ctx| self.bindings.get(&(key.clone(), Some(ctx.to_string()))))
            .or_else(|| self.bindings.get(&(key, None)))
            .map(String::as_str)
    }

    /// Shortcut display string for a command
    pub fn shortcut(&self, command: &str) -> Option<&str> {
        self.shortcuts.get(command).map(String::as_str)
    }
}

/// Normalize key string to canonical form: "ctrl+shift+alt+key"
pub fn normalize_key(key: &str) -> String {
    let key = key.to_lowercase();
    let mut has_ctrl = false;
    let mut has_shift = false;
    let mut has_alt = false;
    let mut main_key = "";

    for part in key.split('+') {
        match part.trim() {
            "ctrl" | "control" | "cmd" | "meta" => has_ctrl = true,
            "shift" => has_shift = true,
            "alt" | "option" => has_alt = true,
            other => main_key = other,
        }
    }

    let mut result = String::new();
    if has_ctrl {
        result.push_str("ctrl+");
    }
    if has_shift {
        result.push_str("shift+");
    }
    if has_alt {
        result.push_str("alt+");
    }
    result.push_str(main_key);
    result
}

pub fn default_keybindings() -> Vec<Keybinding> {
    vec![
        // Clipboard
        Keybinding::new("ctrl+c", "copy", Some("locked")),
        Keybinding::new("ctrl+x", "cut", Some("locked")),
        Keybinding::new("ctrl+v", "paste", Some("locked")),
        Keybinding::new("delete", "clearCells", Some("locked")),
        Keybinding::new("backspace", "clearCells", Some("locked")),
        // History
        Keybinding::new("ctrl+z", "undo", None),
        Keybinding::new("ctrl+y", "redo", None),
        Keybinding::new("ctrl+shift+z", "redo", None),
        // Formatting
        Keybinding::new("ctrl+b", "bold", None),
        Keybinding::new("ctrl+i", "italic", None),
        Keybinding::new("ctrl+shift+l", "alignLeft", None),
        Keybinding::new("ctrl+shift+e", "alignCenter", None),
        Keybinding::new("ctrl+shift+r", "alignRight", None),
        // Structure
        Keybinding::new("ctrl+m", "mergeCells", Some("locked")),
        Keybinding::new("ctrl+shift+m", "splitCell", Some("locked")),
        // Editing
        Keybinding::new("f2", "editCell", Some("locked")),
        Keybinding::new("enter", "editCell", Some("locked")),
        Keybinding::new("escape", "exitEdit", Some("editing")),
        Keybinding::new("escape", "clearSelection", Some("locked")),
        Keybinding::new("ctrl+k", "insertLink", Some("editing")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_orders_modifiers() {
        assert_eq!(normalize_key("Shift+Ctrl+Z"), "ctrl+shift+z");
        assert_eq!(normalize_key("cmd+b"), "ctrl+b");
        assert_eq!(normalize_key("Delete"), "delete");
    }

    #[test]
    fn test_context_binding_wins() {
        let keys = Keybindings::default();
        assert_eq!(keys.command_for("Escape", Some("editing")), Some("exitEdit"));
        assert_eq!(keys.command_for("Escape", Some("locked")), Some("clearSelection"));
        assert_eq!(keys.command_for("ctrl+z", Some("editing")), Some("undo"));
        assert_eq!(keys.command_for("ctrl+c", Some("editing")), None);
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybindings.json");
        fs::write(
            &path,
            r#"[
    // merge with ctrl+g instead
    { "key": "Ctrl+G", "command": "mergeCells", "when": "locked" },
    { "key": "ctrl+b", "command": "underline" }
]"#,
        )
        .unwrap();
        let keys = Keybindings::load_from(&path);
        assert_eq!(keys.command_for("ctrl+g", Some("locked")), Some("mergeCells"));
        assert_eq!(keys.command_for("ctrl+b", None), Some("underline"));
        assert_eq!(keys.shortcut("mergeCells"), Some("Ctrl+G"));
    }

    #[test]
    fn test_broken_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybindings.json");
        fs::write(&path, "[{").unwrap();
        let keys = Keybindings::load_from(&path);
        assert_eq!(keys.command_for("ctrl+y", None), Some("redo"));
    }
}
