//! Interactive table editing on top of the engine.
//!
//! `TableEditor` owns a document and drives a [`Surface`]: pointer input
//! becomes selection, commands and keys become engine calls, and every
//! change is re-rendered and announced to listeners.

pub mod commands;
pub mod edit_mode;
pub mod editor;
pub mod events;
pub mod registry;
pub mod surface;
pub mod text_surface;
pub mod toolbar;

pub use commands::{Command, CommandError, LinkRequest, TableFlag, TextSpan};
pub use edit_mode::EditMode;
pub use editor::TableEditor;
pub use events::{EditorEvent, EventCallback, EventCollector};
pub use registry::{EditorId, SharedRegistry, ToolbarRegistry};
pub use surface::{render_list, PointerEvent, Rect, RenderedCell, Surface};
pub use text_surface::TextSurface;
pub use toolbar::{EditorFacts, ToolbarState};
