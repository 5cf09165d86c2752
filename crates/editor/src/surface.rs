//! The editing surface contract.
//!
//! A surface is whatever draws the table and reports input: a browser
//! DOM, a canvas, a terminal. The editor owns the document and hands the
//! surface a flat list of rendered cells; the surface reports logical
//! positions back. It never mutates the document itself.

use gridtable_core::{CellPos, Placement};
use gridtable_engine::{Cell, GridDocument};

/// Screen-space rectangle in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// One interactive element: a rendered (uncovered) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub placement: Placement,
    pub cell: Cell,
    pub selected: bool,
    pub editing: bool,
    /// Source of a pending cut; surfaces dim these.
    pub cut: bool,
}

impl RenderedCell {
    pub fn pos(&self) -> CellPos {
        self.placement.pos
    }
}

/// Pointer input, already hit-tested to a logical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { pos: CellPos, shift: bool },
    Drag { pos: CellPos },
    Up,
    DoubleClick { pos: CellPos },
}

/// Capabilities the editor needs from a rendering environment.
pub trait Surface {
    /// Replace what is drawn with `cells`.
    fn render(&mut self, cells: &[RenderedCell]);

    /// Bounds of the rendered cell at `pos`, if it is on screen.
    fn cell_rect(&self, pos: CellPos) -> Option<Rect>;

    /// Bounds of the current text selection inside the editing cell.
    fn text_selection_rect(&self) -> Option<Rect>;

    /// Make `pos` editable (text input goes to it), or lock every cell.
    fn set_editing(&mut self, pos: Option<CellPos>);

    /// Mark cut sources so the user sees what a paste will move.
    fn set_cut_marks(&mut self, cells: &[CellPos]);
}

/// Build the render list for `doc`: one entry per rendered cell, row-major.
pub fn render_list(
    doc: &GridDocument,
    selected: &[CellPos],
    editing: Option<CellPos>,
    cut: &[CellPos],
) -> Vec<RenderedCell> {
    doc.placements()
        .into_iter()
        .filter_map(|placement| {
            let cell = doc.cell(placement.pos)?.clone();
            Some(RenderedCell {
                placement,
                cell,
                selected: selected.contains(&placement.pos),
                editing: editing == Some(placement.pos),
                cut: cut.contains(&placement.pos),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_list_skips_covered_slots() {
        let mut doc = GridDocument::new(2, 2);
        doc.merge_cells(&[CellPos::new(0, 0), CellPos::new(0, 1)]).unwrap();
        let list = render_list(&doc, &[CellPos::new(0, 0)], None, &[]);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].placement.colspan, 2);
        assert!(list[0].selected);
        assert!(!list[1].selected);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 5.0);
        let b = Rect::new(20.0, 2.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 30.0, 12.0));
    }
}
