use std::fmt;

use gridtable_core::CellPos;

/// A user action the engine refused. The document is unchanged whenever one
/// of these is returned; callers surface the message, they do not propagate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Removing the only remaining row.
    LastRow,
    /// Removing the only remaining column.
    LastColumn,
    /// A row index outside the table.
    RowOutOfRange { index: usize, rows: usize },
    /// A column index outside the table.
    ColumnOutOfRange { index: usize, cols: usize },
    /// A position that is not a rendered cell.
    NoSuchCell(CellPos),
    /// The operation needs at least one selected cell.
    EmptySelection,
    /// Merge needs two or more cells forming a gap-free rectangle.
    NotRectangular,
    /// Split on a cell that spans a single slot.
    NotMerged(CellPos),
    /// Grow would absorb a cell that is itself part of a merge.
    GrowBlocked { cell: CellPos, neighbor: CellPos },
    /// Paste needs exactly one anchor cell.
    PasteAnchor { selected: usize },
    ClipboardEmpty,
    /// Paste block is taller than the rows available below the anchor.
    NotEnoughRows { needed: usize, available: usize },
    /// Paste block is wider than the cells available right of the anchor in `row`.
    NotEnoughColumns { row: usize, needed: usize, available: usize },
    /// Link editing outside an editing cell, or a range past the text end.
    InvalidTextRange { start: usize, end: usize, len: usize },
    /// Nothing to undo or redo.
    NothingToUndo,
    NothingToRedo,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastRow => write!(f, "Cannot remove the last row"),
            Self::LastColumn => write!(f, "Cannot remove the last column"),
            Self::RowOutOfRange { index, rows } => {
                write!(f, "Row {} does not exist (table has {rows} rows)", index + 1)
            }
            Self::ColumnOutOfRange { index, cols } => {
                write!(f, "Column {} does not exist (table has {cols} columns)", index + 1)
            }
            Self::NoSuchCell(pos) => write!(f, "No cell at {pos}"),
            Self::EmptySelection => write!(f, "Select one or more cells first"),
            Self::NotRectangular => {
                write!(f, "Select two or more cells forming a complete rectangle to merge")
            }
            Self::NotMerged(pos) => write!(f, "Cell {pos} is not merged"),
            Self::GrowBlocked { cell, neighbor } => {
                write!(f, "Cannot grow {cell}: neighbour {neighbor} is part of a merge")
            }
            Self::PasteAnchor { selected } => {
                write!(f, "Select exactly one cell to paste into ({selected} selected)")
            }
            Self::ClipboardEmpty => write!(f, "Clipboard is empty"),
            Self::NotEnoughRows { needed, available } => write!(
                f,
                "Not enough rows to paste: need {needed}, only {available} available ({} short)",
                needed - available
            ),
            Self::NotEnoughColumns { row, needed, available } => write!(
                f,
                "Not enough columns in row {} to paste: need {needed}, only {available} available ({} short)",
                row + 1,
                needed - available
            ),
            Self::InvalidTextRange { start, end, len } => {
                write!(f, "Text range {start}..{end} is outside the cell text (length {len})")
            }
            Self::NothingToUndo => write!(f, "Nothing to undo"),
            Self::NothingToRedo => write!(f, "Nothing to redo"),
        }
    }
}

impl std::error::Error for TableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paste_shortfall_messages() {
        let rows = TableError::NotEnoughRows { needed: 3, available: 1 };
        assert_eq!(rows.to_string(), "Not enough rows to paste: need 3, only 1 available (2 short)");

        let cols = TableError::NotEnoughColumns { row: 0, needed: 2, available: 1 };
        assert!(cols.to_string().contains("row 1"));
        assert!(cols.to_string().contains("1 short"));
    }

    #[test]
    fn test_last_row_message() {
        assert_eq!(TableError::LastRow.to_string(), "Cannot remove the last row");
    }
}
