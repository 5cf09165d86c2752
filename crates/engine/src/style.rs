//! Per-cell styling: alignment, font role, colors, content type and inline
//! bold/italic toggles. Positions resolve to their rendered owners first.

use serde::{Deserialize, Serialize};

use gridtable_core::CellPos;

use crate::cell::{Alignment, Cell, ContentType, FontStyle, ImageData, VerticalAlignment};
use crate::document::GridDocument;
use crate::error::TableError;
use crate::readback::Readback;
use crate::rich_text::{Mark, RichText};

/// Which color field `set_colors` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorType {
    Background,
    Text,
    HoverBackground,
    HoverText,
}

impl ColorType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "background" | "backgroundColor" => Some(Self::Background),
            "text" | "textColor" => Some(Self::Text),
            "hoverBackground" | "hoverBgColor" => Some(Self::HoverBackground),
            "hoverText" | "hoverTextColor" => Some(Self::HoverText),
            _ => None,
        }
    }

    fn field(self, cell: &mut Cell) -> &mut Option<String> {
        match self {
            Self::Background => &mut cell.background_color,
            Self::Text => &mut cell.text_color,
            Self::HoverBackground => &mut cell.hover_bg_color,
            Self::HoverText => &mut cell.hover_text_color,
        }
    }

    fn get(self, cell: &Cell) -> Option<&String> {
        match self {
            Self::Background => cell.background_color.as_ref(),
            Self::Text => cell.text_color.as_ref(),
            Self::HoverBackground => cell.hover_bg_color.as_ref(),
            Self::HoverText => cell.hover_text_color.as_ref(),
        }
    }
}

impl GridDocument {
    /// Apply `f` to every rendered owner among `cells`.
    /// Returns the owners touched, or `EmptySelection` if none resolve.
    pub fn update_cells<F>(&mut self, cells: &[CellPos], mut f: F) -> Result<Vec<CellPos>, TableError>
    where
        F: FnMut(&mut Cell),
    {
        let owners = self.resolve(cells);
        if owners.is_empty() {
            return Err(TableError::EmptySelection);
        }
        for pos in &owners {
            if let Some(cell) = self.cell_mut(*pos) {
                f(cell);
            }
        }
        Ok(owners)
    }

    pub fn set_alignment(&mut self, cells: &[CellPos], alignment: Alignment) -> Result<(), TableError> {
        self.update_cells(cells, |cell| cell.alignment = alignment).map(drop)
    }

    pub fn set_vertical_alignment(
        &mut self,
        cells: &[CellPos],
        alignment: VerticalAlignment,
    ) -> Result<(), TableError> {
        self.update_cells(cells, |cell| cell.vertical_alignment = alignment).map(drop)
    }

    pub fn apply_font_style(&mut self, cells: &[CellPos], style: FontStyle) -> Result<(), TableError> {
        self.update_cells(cells, |cell| cell.font_style = style).map(drop)
    }

    /// Set (or with `None`/empty, clear) one color field.
    pub fn set_colors(
        &mut self,
        cells: &[CellPos],
        color_type: ColorType,
        value: Option<&str>,
    ) -> Result<(), TableError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        self.update_cells(cells, |cell| *color_type.field(cell) = value.clone()).map(drop)
    }

    pub fn set_css_class(&mut self, cells: &[CellPos], class: &str) -> Result<(), TableError> {
        let class = class.trim().to_string();
        self.update_cells(cells, |cell| cell.css_class = class.clone()).map(drop)
    }

    /// Switch content type. Going to image drops text; going to text drops
    /// the image.
    pub fn set_cell_type(&mut self, cells: &[CellPos], content_type: ContentType) -> Result<(), TableError> {
        self.update_cells(cells, |cell| {
            if cell.content_type == content_type {
                return;
            }
            cell.content_type = content_type;
            match content_type {
                ContentType::Image => cell.content.clear(),
                ContentType::Text => cell.image_data = None,
            }
        })
        .map(drop)
    }

    /// Attach an image to a cell, making it an image cell.
    pub fn set_image(&mut self, pos: CellPos, url: &str, alt: &str) -> Result<(), TableError> {
        let cell = self.cell_mut(pos).ok_or(TableError::NoSuchCell(pos))?;
        cell.content_type = ContentType::Image;
        cell.content.clear();
        cell.image_data = Some(ImageData { url: url.trim().to_string(), alt: alt.to_string() });
        Ok(())
    }

    pub fn apply_cell_bold(&mut self, cells: &[CellPos]) -> Result<(), TableError> {
        self.toggle_mark(cells, Mark::Bold)
    }

    pub fn apply_cell_italic(&mut self, cells: &[CellPos]) -> Result<(), TableError> {
        self.toggle_mark(cells, Mark::Italic)
    }

    pub fn apply_cell_underline(&mut self, cells: &[CellPos]) -> Result<(), TableError> {
        self.toggle_mark(cells, Mark::Underline)
    }

    /// Toggle a mark on each text cell independently. Empty cells and image
    /// cells are left alone.
    fn toggle_mark(&mut self, cells: &[CellPos], mark: Mark) -> Result<(), TableError> {
        self.update_cells(cells, |cell| {
            if cell.is_image() {
                return;
            }
            let mut rt = RichText::from_html(&cell.content);
            if rt.is_empty() {
                return;
            }
            rt.toggle(mark);
            cell.content = rt.to_html();
        })
        .map(drop)
    }

    // =========================================================================
    // Readback
    // =========================================================================

    /// Fold a per-cell value over the rendered owners of `cells`.
    pub fn readback<T, F>(&self, cells: &[CellPos], f: F) -> Readback<T>
    where
        T: Clone + PartialEq,
        F: Fn(&Cell) -> Option<T>,
    {
        Readback::collect(
            self.resolve(cells)
                .into_iter()
                .filter_map(|pos| self.cell(pos))
                .map(f),
        )
    }

    pub fn alignment_readback(&self, cells: &[CellPos]) -> Readback<Alignment> {
        self.readback(cells, |cell| Some(cell.alignment))
    }

    pub fn vertical_alignment_readback(&self, cells: &[CellPos]) -> Readback<VerticalAlignment> {
        self.readback(cells, |cell| Some(cell.vertical_alignment))
    }

    pub fn font_style_readback(&self, cells: &[CellPos]) -> Readback<FontStyle> {
        self.readback(cells, |cell| Some(cell.font_style))
    }

    pub fn color_readback(&self, cells: &[CellPos], color_type: ColorType) -> Readback<String> {
        self.readback(cells, |cell| color_type.get(cell).cloned())
    }

    pub fn content_type_readback(&self, cells: &[CellPos]) -> Readback<ContentType> {
        self.readback(cells, |cell| Some(cell.content_type))
    }

    /// Whether the text of every selected cell is entirely bold/italic.
    pub fn mark_readback(&self, cells: &[CellPos], mark: Mark) -> Readback<bool> {
        self.readback(cells, |cell| {
            if cell.is_image() {
                return None;
            }
            let rt = RichText::from_html(&cell.content);
            (!rt.is_empty()).then(|| rt.has_mark_everywhere(mark))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(r: usize, c: usize) -> CellPos {
        CellPos::new(r, c)
    }

    #[test]
    fn test_alignment_applies_to_owners_only() {
        let mut doc = GridDocument::new(2, 2);
        doc.merge_cells(&[pos(0, 0), pos(0, 1)]).unwrap();
        // The covered slot resolves to its owner.
        doc.set_alignment(&[pos(0, 1)], Alignment::Right).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().alignment, Alignment::Right);
        assert_eq!(doc.slot(pos(0, 1)).unwrap().alignment, Alignment::Left);
    }

    #[test]
    fn test_empty_selection_errors() {
        let mut doc = GridDocument::new(1, 1);
        assert_eq!(doc.set_alignment(&[], Alignment::Center), Err(TableError::EmptySelection));
        assert_eq!(
            doc.set_alignment(&[pos(5, 5)], Alignment::Center),
            Err(TableError::EmptySelection)
        );
    }

    #[test]
    fn test_bold_toggle_is_idempotent_in_pairs() {
        let mut doc = GridDocument::new(1, 2);
        doc.cell_mut(pos(0, 0)).unwrap().content = "a &amp; b".into();
        doc.apply_cell_bold(&[pos(0, 0)]).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().content, "<strong>a &amp; b</strong>");
        doc.apply_cell_bold(&[pos(0, 0)]).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().content, "a &amp; b");
    }

    #[test]
    fn test_toggle_skips_images_and_empty_cells() {
        let mut doc = GridDocument::new(1, 2);
        doc.set_image(pos(0, 0), "/a.png", "a").unwrap();
        doc.apply_cell_italic(&[pos(0, 0), pos(0, 1)]).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().content, "");
        assert_eq!(doc.cell(pos(0, 1)).unwrap().content, "");
    }

    #[test]
    fn test_cell_type_switch_clears_other_payload() {
        let mut doc = GridDocument::new(1, 1);
        doc.cell_mut(pos(0, 0)).unwrap().content = "text".into();
        doc.set_cell_type(&[pos(0, 0)], ContentType::Image).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().content, "");
        doc.set_image(pos(0, 0), "/x.png", "").unwrap();
        doc.set_cell_type(&[pos(0, 0)], ContentType::Text).unwrap();
        assert!(doc.cell(pos(0, 0)).unwrap().image_data.is_none());
    }

    #[test]
    fn test_colors_set_and_clear() {
        let mut doc = GridDocument::new(1, 2);
        let all = [pos(0, 0), pos(0, 1)];
        doc.set_colors(&all, ColorType::Background, Some("#eee")).unwrap();
        assert_eq!(doc.color_readback(&all, ColorType::Background), Readback::Uniform("#eee".into()));
        doc.set_colors(&[pos(0, 1)], ColorType::Background, Some(" ")).unwrap();
        assert_eq!(
            doc.color_readback(&all, ColorType::Background),
            Readback::Mixed(vec![Some("#eee".into()), None])
        );
    }

    #[test]
    fn test_readback_mixed_alignment() {
        let mut doc = GridDocument::new(1, 2);
        doc.set_alignment(&[pos(0, 1)], Alignment::Center).unwrap();
        let rb = doc.alignment_readback(&[pos(0, 0), pos(0, 1)]);
        assert!(rb.is_mixed());
    }

    #[test]
    fn test_mark_readback() {
        let mut doc = GridDocument::new(1, 2);
        doc.cell_mut(pos(0, 0)).unwrap().content = "<b>x</b>".into();
        doc.cell_mut(pos(0, 1)).unwrap().content = "y".into();
        assert_eq!(doc.mark_readback(&[pos(0, 0)], Mark::Bold), Readback::Uniform(true));
        assert!(doc.mark_readback(&[pos(0, 0), pos(0, 1)], Mark::Bold).is_mixed());
    }

    #[test]
    fn test_color_type_parse() {
        assert_eq!(ColorType::parse("hoverBgColor"), Some(ColorType::HoverBackground));
        assert_eq!(ColorType::parse("text"), Some(ColorType::Text));
        assert_eq!(ColorType::parse("border"), None);
    }
}
