//! Table engine: the grid document and every operation that mutates it.
//!
//! All operations work on logical `(row, col)` positions and return
//! `Result<_, TableError>`; a refused operation leaves the document as it
//! was.

pub mod borders;
pub mod cell;
pub mod clipboard;
pub mod document;
pub mod error;
pub mod history;
pub mod readback;
pub mod rich_text;
pub mod structure;
pub mod style;

pub use borders::BorderSides;
pub use cell::{
    Alignment, BorderSpec, Cell, CellBorders, ContentType, FontStyle, ImageData, LineStyle, Side,
    VerticalAlignment,
};
pub use clipboard::{Clipboard, ClipboardMode};
pub use document::{Coverage, ExportDocument, GridDocument, ImportMode, Row};
pub use error::TableError;
pub use gridtable_core::{CellPos, Range};
pub use history::History;
pub use readback::Readback;
pub use rich_text::{Link, Mark, RichText};
pub use structure::{Position, ValidationReport};
pub use style::ColorType;
