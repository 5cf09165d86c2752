//! Cell clipboard: copy/cut a block of cells, paste it at a single anchor.

use serde::Serialize;

use gridtable_core::{CellPos, Range};

use crate::cell::Cell;
use crate::document::GridDocument;
use crate::error::TableError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardMode {
    #[default]
    Copy,
    Cut,
}

/// A copied cell and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub source: CellPos,
    pub cell: Cell,
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
    mode: ClipboardMode,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the selected cells. Returns how many were copied.
    pub fn copy(&mut self, doc: &GridDocument, cells: &[CellPos]) -> Result<usize, TableError> {
        self.capture(doc, cells, ClipboardMode::Copy)
    }

    /// Like `copy`; the sources are cleared by the next paste.
    pub fn cut(&mut self, doc: &GridDocument, cells: &[CellPos]) -> Result<usize, TableError> {
        self.capture(doc, cells, ClipboardMode::Cut)
    }

    fn capture(
        &mut self,
        doc: &GridDocument,
        cells: &[CellPos],
        mode: ClipboardMode,
    ) -> Result<usize, TableError> {
        let entries: Vec<ClipboardEntry> = doc
            .resolve(cells)
            .into_iter()
            .filter_map(|source| {
                doc.cell(source).map(|cell| ClipboardEntry { source, cell: cell.clone() })
            })
            .collect();
        if entries.is_empty() {
            return Err(TableError::EmptySelection);
        }
        self.entries = entries;
        self.mode = mode;
        Ok(self.entries.len())
    }

    pub fn mode(&self) -> ClipboardMode {
        self.mode
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.mode = ClipboardMode::Copy;
    }

    /// Sources awaiting removal by a paste (for the surface's cut marks).
    pub fn cut_sources(&self) -> Vec<CellPos> {
        match self.mode {
            ClipboardMode::Cut => self.entries.iter().map(|e| e.source).collect(),
            ClipboardMode::Copy => Vec::new(),
        }
    }

    /// Bounding rectangle of the copied sources.
    pub fn bounds(&self) -> Option<Range> {
        Range::bounding(self.entries.iter().map(|e| e.source))
    }

    /// Paste at the single selected cell.
    ///
    /// Every entry lands at `anchor + (source - origin)`. The whole block
    /// is bounds-checked before anything is written; a shortfall aborts
    /// with the document untouched. Merges intersecting the destination
    /// are split first and pasted cells land 1x1. After a cut, sources the
    /// paste did not overwrite are cleared and the clipboard reverts to
    /// copy mode. Returns the destination positions.
    pub fn paste(
        &mut self,
        doc: &mut GridDocument,
        selection: &[CellPos],
    ) -> Result<Vec<CellPos>, TableError> {
        let Some(bounds) = self.bounds() else {
            return Err(TableError::ClipboardEmpty);
        };
        let [target] = selection else {
            return Err(TableError::PasteAnchor { selected: selection.len() });
        };
        let anchor = doc.owner_of(*target).ok_or(TableError::NoSuchCell(*target))?;
        let origin = bounds.top_left();

        let available = doc.row_count() - anchor.row;
        if bounds.height() > available {
            return Err(TableError::NotEnoughRows { needed: bounds.height(), available });
        }
        for dr in 0..bounds.height() {
            let needed = self
                .entries
                .iter()
                .filter(|e| e.source.row - origin.row == dr)
                .map(|e| e.source.col - origin.col + 1)
                .max();
            let Some(needed) = needed else { continue };
            let row = anchor.row + dr;
            let available = doc.literal_len(row).saturating_sub(anchor.col);
            if needed > available {
                return Err(TableError::NotEnoughColumns { row, needed, available });
            }
        }

        let destinations: Vec<CellPos> = self
            .entries
            .iter()
            .map(|e| {
                CellPos::new(
                    anchor.row + e.source.row - origin.row,
                    anchor.col + e.source.col - origin.col,
                )
            })
            .collect();

        let mut merged_owners: Vec<CellPos> = destinations
            .iter()
            .filter_map(|dest| doc.owner_of(*dest))
            .filter(|owner| doc.can_split(*owner))
            .collect();
        merged_owners.sort();
        merged_owners.dedup();
        for owner in merged_owners {
            doc.split_cell(owner)?;
        }

        for (entry, dest) in self.entries.iter().zip(&destinations) {
            doc.revive_orphan(*dest);
            if let Some(slot) = doc.slot_mut(*dest) {
                let mut cell = entry.cell.clone();
                cell.reset_span();
                *slot = cell;
            }
        }

        if self.mode == ClipboardMode::Cut {
            for entry in &self.entries {
                if destinations.contains(&entry.source) {
                    continue;
                }
                if let Some(slot) = doc.slot_mut(entry.source) {
                    slot.clear_content();
                }
            }
            self.mode = ClipboardMode::Copy;
        }
        doc.rebuild_coverage();
        log::debug!("pasted {} cells at {anchor}", destinations.len());
        Ok(destinations)
    }

    /// Plain-text rendering for the system clipboard: tab-separated columns,
    /// newline-separated rows, empty fields for gaps.
    pub fn to_tsv(&self) -> String {
        let Some(bounds) = self.bounds() else {
            return String::new();
        };
        let mut lines = Vec::with_capacity(bounds.height());
        for r in bounds.start_row..=bounds.end_row {
            let fields: Vec<String> = (bounds.start_col..=bounds.end_col)
                .map(|c| {
                    self.entries
                        .iter()
                        .find(|e| e.source == CellPos::new(r, c))
                        .map(|e| tsv_field(&e.cell))
                        .unwrap_or_default()
                })
                .collect();
            lines.push(fields.join("\t"));
        }
        lines.join("\n")
    }
}

fn tsv_field(cell: &Cell) -> String {
    if let Some(image) = &cell.image_data {
        return image.url.clone();
    }
    crate::rich_text::RichText::from_html(&cell.content)
        .plain_text()
        .replace(['\t', '\n'], " ")
}

impl GridDocument {
    /// Empty the text of the selected cells; type, spans and style stay.
    pub fn clear_cells(&mut self, cells: &[CellPos]) -> Result<(), TableError> {
        self.update_cells(cells, |cell| cell.content.clear()).map(drop)
    }
}
