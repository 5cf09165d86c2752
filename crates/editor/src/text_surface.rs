//! A plain-text surface: draws the table as a character grid.
//!
//! Used by the command-line driver and by tests. Every grid column is
//! `column_width` characters wide; a cell's rectangle is measured in
//! characters and lines.

use std::ops::Range as TextRange;

use gridtable_core::CellPos;
use gridtable_engine::rich_text::RichText;

use crate::surface::{Rect, RenderedCell, Surface};

#[derive(Debug, Clone)]
pub struct TextSurface {
    column_width: usize,
    cells: Vec<RenderedCell>,
    editing: Option<CellPos>,
    cut: Vec<CellPos>,
    text_selection: Option<TextRange<usize>>,
    renders: usize,
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new(12)
    }
}

impl TextSurface {
    pub fn new(column_width: usize) -> Self {
        Self {
            column_width: column_width.max(3),
            cells: Vec::new(),
            editing: None,
            cut: Vec::new(),
            text_selection: None,
            renders: 0,
        }
    }

    /// Char range selected inside the editing cell (drives the floating toolbar).
    pub fn set_text_selection(&mut self, range: Option<TextRange<usize>>) {
        self.text_selection = range;
    }

    pub fn cells(&self) -> &[RenderedCell] {
        &self.cells
    }

    pub fn editing(&self) -> Option<CellPos> {
        self.editing
    }

    pub fn cut_marks(&self) -> &[CellPos] {
        &self.cut
    }

    /// How many times the editor has rendered into this surface.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    fn cell_covering(&self, row: usize, col: usize) -> Option<&RenderedCell> {
        self.cells
            .iter()
            .find(|c| c.placement.area().contains(CellPos::new(row, col)))
    }

    fn span_width(&self, colspan: usize) -> usize {
        colspan * (self.column_width + 1) - 1
    }

    fn label(cell: &RenderedCell) -> String {
        let marker = if cell.editing {
            ">"
        } else if cell.cut {
            "~"
        } else if cell.selected {
            "*"
        } else {
            ""
        };
        let text = match (&cell.cell.image_data, cell.cell.is_image()) {
            (Some(img), true) => format!("[img {}]", img.alt),
            _ => RichText::from_html(&cell.cell.content).plain_text(),
        };
        let text = text.replace(['\n', '\t'], " ");
        format!("{marker}{}", text.trim())
    }

    /// The last rendered table as text.
    pub fn to_text(&self) -> String {
        let rows = self
            .cells
            .iter()
            .map(|c| c.placement.pos.row + c.placement.rowspan)
            .max()
            .unwrap_or(0);
        let cols = self
            .cells
            .iter()
            .map(|c| c.placement.pos.col + c.placement.colspan)
            .max()
            .unwrap_or(0);

        let rule = format!("+{}\n", format!("{}+", "-".repeat(self.column_width)).repeat(cols));
        let mut out = rule.clone();
        for row in 0..rows {
            let mut line = String::new();
            let mut col = 0;
            while col < cols {
                line.push('|');
                match self.cell_covering(row, col) {
                    Some(cell) if cell.pos().col == col => {
                        let width = self.span_width(cell.placement.colspan);
                        let text = if cell.pos().row == row { Self::label(cell) } else { String::new() };
                        let text: String = text.chars().take(width).collect();
                        line.push_str(&format!("{text:<width$}"));
                        col += cell.placement.colspan;
                    }
                    _ => {
                        line.push_str(&" ".repeat(self.column_width));
                        col += 1;
                    }
                }
            }
            line.push_str("|\n");
            out.push_str(&line);
            out.push_str(&rule);
        }
        out
    }
}

impl Surface for TextSurface {
    fn render(&mut self, cells: &[RenderedCell]) {
        self.cells = cells.to_vec();
        self.renders += 1;
    }

    fn cell_rect(&self, pos: CellPos) -> Option<Rect> {
        let cell = self.cells.iter().find(|c| c.pos() == pos)?;
        let step = (self.column_width + 1) as f32;
        Some(Rect::new(
            pos.col as f32 * step + 1.0,
            (pos.row * 2 + 1) as f32,
            self.span_width(cell.placement.colspan) as f32,
            (cell.placement.rowspan * 2 - 1) as f32,
        ))
    }

    fn text_selection_rect(&self) -> Option<Rect> {
        let range = self.text_selection.clone()?;
        let cell = self.cell_rect(self.editing?)?;
        Some(Rect::new(cell.x + range.start as f32, cell.y, range.len().max(1) as f32, 1.0))
    }

    fn set_editing(&mut self, pos: Option<CellPos>) {
        self.editing = pos;
        if pos.is_none() {
            self.text_selection = None;
        }
    }

    fn set_cut_marks(&mut self, cells: &[CellPos]) {
        self.cut = cells.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::render_list;
    use gridtable_engine::GridDocument;

    #[test]
    fn test_merged_cell_spans_columns() {
        let mut doc = GridDocument::new(2, 2);
        doc.cell_mut(CellPos::new(0, 0)).unwrap().content = "<b>Title</b>".into();
        doc.merge_cells(&[CellPos::new(0, 0), CellPos::new(0, 1)]).unwrap();
        doc.cell_mut(CellPos::new(1, 1)).unwrap().content = "x".into();

        let mut surface = TextSurface::new(4);
        surface.render(&render_list(&doc, &[], None, &[]));
        assert_eq!(
            surface.to_text(),
            "+----+----+\n|Title    |\n+----+----+\n|    |x   |\n+----+----+\n"
        );
    }

    #[test]
    fn test_cell_rect_and_text_selection() {
        let doc = GridDocument::new(2, 2);
        let mut surface = TextSurface::new(4);
        surface.render(&render_list(&doc, &[], None, &[]));
        assert_eq!(surface.cell_rect(CellPos::new(1, 1)), Some(Rect::new(6.0, 3.0, 4.0, 1.0)));
        assert_eq!(surface.text_selection_rect(), None);

        surface.set_editing(Some(CellPos::new(1, 1)));
        surface.set_text_selection(Some(1..3));
        assert_eq!(surface.text_selection_rect(), Some(Rect::new(7.0, 3.0, 2.0, 1.0)));
    }
}
