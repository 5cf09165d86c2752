//! Border sides and their mirroring onto neighbouring cells.
//!
//! A visible line between two cells is stored on both of them: the right
//! side of the left cell and the left side of the right cell. Writes always
//! touch both so the line reads the same whichever cell is selected.

use serde::{Deserialize, Serialize};

use gridtable_core::CellPos;

use crate::cell::{BorderSpec, Side};
use crate::document::GridDocument;
use crate::error::TableError;
use crate::readback::Readback;

/// Per-side tri-state: `Some(true)` on, `Some(false)` off, `None` untouched
/// (when writing) or mixed (when read back).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSides {
    pub top: Option<bool>,
    pub right: Option<bool>,
    pub bottom: Option<bool>,
    pub left: Option<bool>,
}

impl BorderSides {
    pub fn all(on: bool) -> Self {
        Self { top: Some(on), right: Some(on), bottom: Some(on), left: Some(on) }
    }

    pub fn get(&self, side: Side) -> Option<bool> {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    pub fn set(&mut self, side: Side, value: Option<bool>) {
        match side {
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
    }
}

impl GridDocument {
    /// Rendered cells touching `pos` on `side`. Spans on both sides are
    /// honoured: a cell two rows tall can have two right neighbours, and a
    /// wide neighbour is reported once. Orphaned placeholders are skipped.
    pub fn find_adjacent_cells(&self, pos: CellPos, side: Side) -> Vec<CellPos> {
        let Some(owner) = self.owner_of(pos) else {
            return Vec::new();
        };
        let Some(area) = self.span_area(owner) else {
            return Vec::new();
        };

        let outside: Vec<CellPos> = match side {
            Side::Top if area.start_row > 0 => (area.start_col..=area.end_col)
                .map(|c| CellPos::new(area.start_row - 1, c))
                .collect(),
            Side::Bottom => (area.start_col..=area.end_col)
                .map(|c| CellPos::new(area.end_row + 1, c))
                .collect(),
            Side::Left if area.start_col > 0 => (area.start_row..=area.end_row)
                .map(|r| CellPos::new(r, area.start_col - 1))
                .collect(),
            Side::Right => (area.start_row..=area.end_row)
                .map(|r| CellPos::new(r, area.end_col + 1))
                .collect(),
            _ => Vec::new(),
        };

        let mut adjacent = Vec::new();
        for slot in outside {
            if let Some(neighbor) = self.owner_of(slot) {
                if neighbor != owner && !adjacent.contains(&neighbor) {
                    adjacent.push(neighbor);
                }
            }
        }
        adjacent
    }

    /// Set or remove border sides on every selected cell and mirror each
    /// change onto the opposite side of the adjacent cells.
    pub fn set_borders(
        &mut self,
        cells: &[CellPos],
        sides: BorderSides,
        spec: &BorderSpec,
    ) -> Result<(), TableError> {
        let owners = self.resolve(cells);
        if owners.is_empty() {
            return Err(TableError::EmptySelection);
        }
        for owner in owners {
            for side in Side::ALL {
                let Some(on) = sides.get(side) else { continue };
                let value = on.then(|| spec.clone());
                let adjacent = self.find_adjacent_cells(owner, side);
                if let Some(cell) = self.cell_mut(owner) {
                    cell.borders.set(side, value.clone());
                }
                for neighbor in adjacent {
                    if let Some(cell) = self.cell_mut(neighbor) {
                        cell.borders.set(side.opposite(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// The border spec on `side` across the selection.
    pub fn border_readback(&self, cells: &[CellPos], side: Side) -> Readback<BorderSpec> {
        self.readback(cells, |cell| cell.borders.get(side).cloned())
    }

    /// Which sides are on for every selected cell (`Some(true)`), off for
    /// every one (`Some(false)`), or mixed (`None`).
    pub fn border_sides_readback(&self, cells: &[CellPos]) -> BorderSides {
        let mut sides = BorderSides::default();
        for side in Side::ALL {
            let present = self.readback(cells, |cell| Some(cell.borders.get(side).is_some()));
            sides.set(side, present.uniform().copied());
        }
        sides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::LineStyle;

    fn pos(r: usize, c: usize) -> CellPos {
        CellPos::new(r, c)
    }

    fn thick() -> BorderSpec {
        BorderSpec::new("3px", LineStyle::Solid, "#333333")
    }

    #[test]
    fn test_right_border_mirrors_onto_left_of_neighbor() {
        let mut doc = GridDocument::new(2, 2);
        let sides = BorderSides { right: Some(true), ..BorderSides::default() };
        doc.set_borders(&[pos(0, 0)], sides, &thick()).unwrap();
        assert_eq!(doc.cell(pos(0, 0)).unwrap().borders.right, Some(thick()));
        assert_eq!(doc.cell(pos(0, 1)).unwrap().borders.left, Some(thick()));
        assert!(doc.cell(pos(0, 0)).unwrap().borders.top.is_none());
    }

    #[test]
    fn test_removal_is_mirrored_too() {
        let mut doc = GridDocument::new(2, 2);
        doc.set_borders(&[pos(1, 1)], BorderSides::all(true), &thick()).unwrap();
        assert!(doc.cell(pos(0, 1)).unwrap().borders.bottom.is_some());
        let off = BorderSides { top: Some(false), ..BorderSides::default() };
        doc.set_borders(&[pos(1, 1)], off, &thick()).unwrap();
        assert!(doc.cell(pos(0, 1)).unwrap().borders.bottom.is_none());
        assert!(doc.cell(pos(1, 1)).unwrap().borders.left.is_some());
    }

    #[test]
    fn test_tall_cell_has_two_right_neighbors() {
        let mut doc = GridDocument::new(2, 2);
        doc.merge_cells(&[pos(0, 0), pos(1, 0)]).unwrap();
        assert_eq!(doc.find_adjacent_cells(pos(0, 0), Side::Right), vec![pos(0, 1), pos(1, 1)]);
    }

    #[test]
    fn test_wide_neighbor_reported_once() {
        let mut doc = GridDocument::new(2, 2);
        doc.merge_cells(&[pos(1, 0), pos(1, 1)]).unwrap();
        assert_eq!(doc.find_adjacent_cells(pos(0, 0), Side::Bottom), vec![pos(1, 0)]);
        assert_eq!(doc.find_adjacent_cells(pos(0, 1), Side::Bottom), vec![pos(1, 0)]);
    }

    #[test]
    fn test_no_neighbors_at_edges() {
        let doc = GridDocument::new(2, 2);
        assert!(doc.find_adjacent_cells(pos(0, 0), Side::Top).is_empty());
        assert!(doc.find_adjacent_cells(pos(0, 0), Side::Left).is_empty());
        assert!(doc.find_adjacent_cells(pos(1, 1), Side::Right).is_empty());
    }

    #[test]
    fn test_covered_slot_resolves_to_owner() {
        let mut doc = GridDocument::new(1, 3);
        doc.merge_cells(&[pos(0, 0), pos(0, 1)]).unwrap();
        assert_eq!(doc.find_adjacent_cells(pos(0, 1), Side::Right), vec![pos(0, 2)]);
    }

    #[test]
    fn test_sides_readback_tri_state() {
        let mut doc = GridDocument::new(1, 3);
        let top = BorderSides { top: Some(true), ..BorderSides::default() };
        doc.set_borders(&[pos(0, 0), pos(0, 1)], top, &thick()).unwrap();
        let both = doc.border_sides_readback(&[pos(0, 0), pos(0, 1)]);
        assert_eq!(both.top, Some(true));
        assert_eq!(both.bottom, Some(false));
        let mixed = doc.border_sides_readback(&[pos(0, 1), pos(0, 2)]);
        assert_eq!(mixed.top, None);
    }

    #[test]
    fn test_border_spec_readback() {
        let mut doc = GridDocument::new(1, 2);
        let right = BorderSides { right: Some(true), ..BorderSides::default() };
        doc.set_borders(&[pos(0, 0)], right, &thick()).unwrap();
        assert_eq!(doc.border_readback(&[pos(0, 0)], Side::Right), Readback::Uniform(thick()));
        assert_eq!(doc.border_readback(&[pos(0, 1)], Side::Right), Readback::Unset);
    }
}
