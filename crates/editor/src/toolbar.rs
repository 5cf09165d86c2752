//! Toolbar state: what a toolbar needs to enable buttons and pre-fill
//! controls for the current selection.

use serde::Serialize;

use gridtable_core::CellPos;
use gridtable_engine::{
    Alignment, BorderSides, BorderSpec, ClipboardMode, ColorType, ContentType, FontStyle,
    GridDocument, Mark, Readback, Side, VerticalAlignment,
};

/// Snapshot of the selection's editable state. Values that differ across
/// the selection read back as `Mixed`, never as one cell's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub selection_count: usize,
    pub editing: Option<CellPos>,
    pub can_merge: bool,
    pub can_split: bool,
    pub can_grow: bool,
    pub can_shrink: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub clipboard: Option<ClipboardMode>,
    pub show_borders: bool,
    pub borders: BorderSides,
    /// Line spec of each side, in top/right/bottom/left order.
    pub border_specs: [Readback<BorderSpec>; 4],
    pub alignment: Readback<Alignment>,
    pub vertical_alignment: Readback<VerticalAlignment>,
    pub font_style: Readback<FontStyle>,
    pub content_type: Readback<ContentType>,
    pub background_color: Readback<String>,
    pub text_color: Readback<String>,
    pub hover_bg_color: Readback<String>,
    pub hover_text_color: Readback<String>,
    pub bold: Readback<bool>,
    pub italic: Readback<bool>,
}

/// Editor-side facts the document alone does not know.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorFacts {
    pub editing: Option<CellPos>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub clipboard: Option<ClipboardMode>,
}

impl ToolbarState {
    pub fn compute(doc: &GridDocument, selection: &[CellPos], facts: EditorFacts) -> Self {
        let single = match selection {
            [pos] => doc.owner_of(*pos),
            _ => None,
        };
        let can_grow = single.is_some_and(|pos| doc.can_grow(pos));
        let can_shrink = single
            .and_then(|pos| doc.cell(pos))
            .is_some_and(|cell| cell.colspan > 1);

        Self {
            selection_count: selection.len(),
            editing: facts.editing,
            can_merge: doc.can_merge(selection),
            can_split: single.is_some_and(|pos| doc.can_split(pos)),
            can_grow,
            can_shrink,
            can_undo: facts.can_undo,
            can_redo: facts.can_redo,
            clipboard: facts.clipboard,
            show_borders: doc.show_borders,
            borders: doc.border_sides_readback(selection),
            border_specs: Side::ALL.map(|side| doc.border_readback(selection, side)),
            alignment: doc.alignment_readback(selection),
            vertical_alignment: doc.vertical_alignment_readback(selection),
            font_style: doc.font_style_readback(selection),
            content_type: doc.content_type_readback(selection),
            background_color: doc.color_readback(selection, ColorType::Background),
            text_color: doc.color_readback(selection, ColorType::Text),
            hover_bg_color: doc.color_readback(selection, ColorType::HoverBackground),
            hover_text_color: doc.color_readback(selection, ColorType::HoverText),
            bold: doc.mark_readback(selection, Mark::Bold),
            italic: doc.mark_readback(selection, Mark::Italic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_alignment_is_reported() {
        let mut doc = GridDocument::new(2, 2);
        doc.set_alignment(&[CellPos::new(0, 1)], Alignment::Right).unwrap();
        let sel = [CellPos::new(0, 0), CellPos::new(0, 1)];
        let state = ToolbarState::compute(&doc, &sel, EditorFacts::default());
        assert!(state.alignment.is_mixed());
        assert!(state.can_merge);
        assert!(!state.can_split);
        assert_eq!(state.selection_count, 2);
    }

    #[test]
    fn test_single_cell_eligibility() {
        let mut doc = GridDocument::new(2, 3);
        doc.merge_cells(&[CellPos::new(0, 0), CellPos::new(0, 1)]).unwrap();
        let state = ToolbarState::compute(&doc, &[CellPos::new(0, 0)], EditorFacts::default());
        assert!(state.can_split);
        assert!(state.can_shrink);
        assert!(state.can_grow);

        let edge = ToolbarState::compute(&doc, &[CellPos::new(1, 2)], EditorFacts::default());
        assert!(!edge.can_grow);
        assert!(!edge.can_shrink);
    }

    #[test]
    fn test_grow_disabled_next_to_merge() {
        let mut doc = GridDocument::new(2, 3);
        doc.merge_cells(&[CellPos::new(0, 1), CellPos::new(1, 1)]).unwrap();
        let blocked = ToolbarState::compute(&doc, &[CellPos::new(0, 0)], EditorFacts::default());
        assert!(!blocked.can_grow);
        let merged = ToolbarState::compute(&doc, &[CellPos::new(1, 1)], EditorFacts::default());
        assert!(merged.can_grow);
    }

    #[test]
    fn test_serializes_camel_case() {
        let doc = GridDocument::new(1, 1);
        let state = ToolbarState::compute(&doc, &[CellPos::new(0, 0)], EditorFacts::default());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["selectionCount"], 1);
        assert_eq!(json["alignment"]["state"], "uniform");
        assert_eq!(json["alignment"]["value"], "left");
    }
}
