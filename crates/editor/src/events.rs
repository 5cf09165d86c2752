//! Event types for editor notifications.
//!
//! The widget config store listens for `DocumentChanged`; toolbars and
//! context menus listen for selection and edit-mode changes. Listeners may
//! fail; the editor has already committed by then and only reports it.

use gridtable_core::CellPos;
use gridtable_engine::ExportDocument;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The document changed; carries the export form (covered slots dropped).
    DocumentChanged(ExportDocument),

    /// The selected cells changed.
    SelectionChanged(Vec<CellPos>),

    /// A cell entered edit mode (`Some`) or editing ended (`None`).
    EditModeChanged(Option<CellPos>),

    /// A user-facing message: a refused action or a failed notification.
    Status(String),

    /// The user asked for the import dialog.
    ImportRequested,

    /// The user asked to insert a link in the editing cell.
    LinkRequested(CellPos),
}

/// Callback type for receiving editor events. An `Err` is logged and shown
/// as a status message; it never rolls anything back.
pub type EventCallback = Box<dyn FnMut(&EditorEvent) -> Result<(), String>>;

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<EditorEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[EditorEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Exported documents, oldest first.
    pub fn documents(&self) -> Vec<&ExportDocument> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditorEvent::DocumentChanged(doc) => Some(doc),
                _ => None,
            })
            .collect()
    }

    pub fn selections(&self) -> Vec<&[CellPos]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditorEvent::SelectionChanged(cells) => Some(cells.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EditorEvent::Status(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_collector_filtering() {
        let mut collector = EventCollector::new();
        collector.push(EditorEvent::SelectionChanged(vec![CellPos::new(0, 0)]));
        collector.push(EditorEvent::Status("Cannot remove the last row".into()));
        collector.push(EditorEvent::EditModeChanged(None));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.selections(), vec![&[CellPos::new(0, 0)][..]]);
        assert_eq!(collector.statuses(), vec!["Cannot remove the last row"]);
        assert!(collector.documents().is_empty());

        collector.clear();
        assert!(collector.is_empty());
    }
}
