//! Undo/redo history of whole-document snapshots.

use crate::document::GridDocument;
use crate::error::TableError;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Operation that produced the change, for status messages.
    pub label: String,
    pub snapshot: GridDocument,
}

#[derive(Debug)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record the document as it was before a successful mutation.
    pub fn record(&mut self, label: impl Into<String>, before: GridDocument) {
        self.undo_stack.push(HistoryEntry { label: label.into(), snapshot: before });
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Swap `current` for the last snapshot. Returns the label undone.
    pub fn undo(&mut self, current: &mut GridDocument) -> Result<String, TableError> {
        let entry = self.undo_stack.pop().ok_or(TableError::NothingToUndo)?;
        let redo = std::mem::replace(current, entry.snapshot);
        self.redo_stack.push(HistoryEntry { label: entry.label.clone(), snapshot: redo });
        Ok(entry.label)
    }

    pub fn redo(&mut self, current: &mut GridDocument) -> Result<String, TableError> {
        let entry = self.redo_stack.pop().ok_or(TableError::NothingToRedo)?;
        let undo = std::mem::replace(current, entry.snapshot);
        self.undo_stack.push(HistoryEntry { label: entry.label.clone(), snapshot: undo });
        Ok(entry.label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
