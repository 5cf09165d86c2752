// Configuration loading

pub mod import_profile;
pub mod keybindings;
pub mod settings;

pub use import_profile::ImportProfile;
pub use keybindings::{Keybinding, Keybindings};
pub use settings::EditorSettings;
