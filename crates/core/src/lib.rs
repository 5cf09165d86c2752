//! Framework-agnostic addressing and selection for the table editor.
//!
//! Everything here works on logical `(row, col)` positions. Rendering
//! environments report positions, never live widgets.

pub mod range;
pub mod selection;

pub use range::{CellPos, Range};
pub use selection::{cells_in_rect, Placement, SelectionState};
