//! Structural operations: rows, columns, merges, validation and repair.
//!
//! Every operation either fails with a [`TableError`] before touching the
//! document or completes and leaves coverage rebuilt.

use rustc_hash::FxHashSet;
use serde::Serialize;

use gridtable_core::{CellPos, Range};

use crate::cell::Cell;
use crate::document::{Coverage, GridDocument, Row};
use crate::error::TableError;

/// Where to insert a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
    /// Insert before this index; `len` appends.
    Index(usize),
}

impl Position {
    /// Insertion index for a sequence of `len`, or the offending index.
    fn resolve(self, len: usize) -> Result<usize, usize> {
        match self {
            Position::Start => Ok(0),
            Position::End => Ok(len),
            Position::Index(i) if i <= len => Ok(i),
            Position::Index(i) => Err(i),
        }
    }
}

/// Result of [`GridDocument::validate_table_structure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub expected_columns: usize,
}

/// An owner and its spans, collected before mutating.
#[derive(Debug, Clone, Copy)]
struct Span {
    pos: CellPos,
    rowspan: usize,
    colspan: usize,
}

impl GridDocument {
    fn spans(&self) -> Vec<Span> {
        self.owners()
            .filter_map(|pos| {
                self.slot(pos).map(|cell| Span {
                    pos,
                    rowspan: cell.rowspan.max(1),
                    colspan: cell.colspan.max(1),
                })
            })
            .collect()
    }

    // =========================================================================
    // Rows and columns
    // =========================================================================

    /// Insert a blank row. A row inserted inside a merge extends it.
    /// Returns the new row's index.
    pub fn add_row(&mut self, position: Position) -> Result<usize, TableError> {
        let rows = self.row_count();
        let at = position
            .resolve(rows)
            .map_err(|index| TableError::RowOutOfRange { index, rows })?;

        for span in self.spans() {
            if span.pos.row < at && at < span.pos.row + span.rowspan {
                if let Some(cell) = self.slot_mut(span.pos) {
                    cell.rowspan += 1;
                }
            }
        }
        self.remap_orphans(|p| Some(if p.row >= at { CellPos::new(p.row + 1, p.col) } else { p }));
        self.rows.insert(at, Row::blank(self.column_count()));
        self.rebuild_coverage();
        Ok(at)
    }

    /// Remove a row. Merges crossing it shrink; a merge owned by a cell in
    /// the removed row moves its owner down one row.
    pub fn remove_row(&mut self, index: usize) -> Result<(), TableError> {
        let rows = self.row_count();
        if index >= rows {
            return Err(TableError::RowOutOfRange { index, rows });
        }
        if rows == 1 {
            return Err(TableError::LastRow);
        }

        for span in self.spans() {
            if span.pos.row < index && index < span.pos.row + span.rowspan {
                if let Some(cell) = self.slot_mut(span.pos) {
                    cell.rowspan -= 1;
                }
            } else if span.pos.row == index && span.rowspan > 1 {
                let Some(mut owner) = self.slot(span.pos).cloned() else { continue };
                owner.rowspan -= 1;
                if let Some(next) = self.slot_mut(CellPos::new(index + 1, span.pos.col)) {
                    *next = owner;
                }
            }
        }
        self.remap_orphans(|p| match p.row {
            r if r == index => None,
            r if r > index => Some(CellPos::new(r - 1, p.col)),
            _ => Some(p),
        });
        self.rows.remove(index);
        self.rebuild_coverage();
        Ok(())
    }

    /// Insert a blank column with width `auto`. Returns its index.
    pub fn add_column(&mut self, position: Position) -> Result<usize, TableError> {
        self.add_column_with_width(position, "auto")
    }

    pub fn add_column_with_width(
        &mut self,
        position: Position,
        width: &str,
    ) -> Result<usize, TableError> {
        let cols = self.column_count();
        let at = position
            .resolve(cols)
            .map_err(|index| TableError::ColumnOutOfRange { index, cols })?;

        for span in self.spans() {
            if span.pos.col < at && at < span.pos.col + span.colspan {
                if let Some(cell) = self.slot_mut(span.pos) {
                    cell.colspan += 1;
                }
            }
        }
        self.remap_orphans(|p| Some(if p.col >= at { CellPos::new(p.row, p.col + 1) } else { p }));
        for row in &mut self.rows {
            let idx = at.min(row.cells.len());
            row.cells.insert(idx, Cell::default());
        }
        self.column_widths.insert(at, width.to_string());
        self.rebuild_coverage();
        Ok(at)
    }

    pub fn remove_column(&mut self, index: usize) -> Result<(), TableError> {
        let cols = self.column_count();
        if index >= cols {
            return Err(TableError::ColumnOutOfRange { index, cols });
        }
        if cols == 1 {
            return Err(TableError::LastColumn);
        }

        for span in self.spans() {
            if span.pos.col < index && index < span.pos.col + span.colspan {
                if let Some(cell) = self.slot_mut(span.pos) {
                    cell.colspan -= 1;
                }
            } else if span.pos.col == index && span.colspan > 1 {
                let Some(mut owner) = self.slot(span.pos).cloned() else { continue };
                owner.colspan -= 1;
                if let Some(next) = self.slot_mut(CellPos::new(span.pos.row, index + 1)) {
                    *next = owner;
                }
            }
        }
        self.remap_orphans(|p| match p.col {
            c if c == index => None,
            c if c > index => Some(CellPos::new(p.row, c - 1)),
            _ => Some(p),
        });
        for row in &mut self.rows {
            if index < row.cells.len() {
                row.cells.remove(index);
            }
        }
        self.column_widths.remove(index);
        self.rebuild_coverage();
        Ok(())
    }

    pub fn set_column_width(&mut self, index: usize, width: &str) -> Result<(), TableError> {
        let cols = self.column_count();
        let slot = self
            .column_widths
            .get_mut(index)
            .ok_or(TableError::ColumnOutOfRange { index, cols })?;
        *slot = width.trim().to_string();
        Ok(())
    }

    pub fn set_row_height(&mut self, index: usize, height: Option<&str>) -> Result<(), TableError> {
        let rows = self.row_count();
        let row = self.rows.get_mut(index).ok_or(TableError::RowOutOfRange { index, rows })?;
        row.height = height.map(|h| h.trim().to_string()).filter(|h| !h.is_empty());
        Ok(())
    }

    // =========================================================================
    // Merge and split
    // =========================================================================

    /// The rectangle a merge of `cells` would produce, if it is one.
    ///
    /// Positions resolve to their rendered owners; the owners' span areas
    /// must tile their bounding rectangle exactly.
    pub fn merge_rect(&self, cells: &[CellPos]) -> Option<Range> {
        let owners = self.resolve(cells);
        if owners.len() < 2 {
            return None;
        }
        let areas: Vec<Range> = owners.iter().filter_map(|p| self.span_area(*p)).collect();
        let rect = Range::bounding(areas.iter().flat_map(|a| [a.top_left(), a.bottom_right()]))?;

        let mut seen = FxHashSet::default();
        for area in &areas {
            for pos in area.cells() {
                if !seen.insert(pos) {
                    return None;
                }
            }
        }
        (seen.len() == rect.cell_count()).then_some(rect)
    }

    pub fn can_merge(&self, cells: &[CellPos]) -> bool {
        self.merge_rect(cells).is_some()
    }

    /// Merge a rectangle of cells into its top-left cell. Text of the
    /// merged cells is joined into the owner; placeholders are cleared.
    /// Returns the owner position.
    pub fn merge_cells(&mut self, cells: &[CellPos]) -> Result<CellPos, TableError> {
        if cells.is_empty() {
            return Err(TableError::EmptySelection);
        }
        let rect = self.merge_rect(cells).ok_or(TableError::NotRectangular)?;
        let owner = rect.top_left();

        let joined = self
            .resolve(cells)
            .into_iter()
            .filter_map(|pos| self.slot(pos))
            .filter(|cell| !cell.is_image())
            .map(|cell| cell.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        for pos in rect.cells() {
            if pos == owner {
                continue;
            }
            if let Some(slot) = self.slot_mut(pos) {
                slot.clear_content();
                slot.reset_span();
            }
        }
        if let Some(cell) = self.slot_mut(owner) {
            cell.rowspan = rect.height();
            cell.colspan = rect.width();
            if !cell.is_image() {
                cell.content = joined;
            }
        }
        self.rebuild_coverage();
        log::debug!("merged {} into {owner}", rect.cell_count());
        Ok(owner)
    }

    pub fn can_split(&self, pos: CellPos) -> bool {
        self.cell(pos).map(Cell::is_merged).unwrap_or(false)
    }

    /// Reset a merged cell to 1x1; every slot it covered becomes an empty
    /// cell. Returns the positions that are rendered again.
    pub fn split_cell(&mut self, pos: CellPos) -> Result<Vec<CellPos>, TableError> {
        let area = self.span_area(pos).ok_or(TableError::NoSuchCell(pos))?;
        if area.cell_count() == 1 {
            return Err(TableError::NotMerged(pos));
        }
        let mut freed = Vec::with_capacity(area.cell_count());
        for covered in area.cells() {
            let Some(slot) = self.slot_mut(covered) else { continue };
            if covered == pos {
                slot.reset_span();
            } else {
                *slot = Cell::default();
            }
            freed.push(covered);
        }
        self.rebuild_coverage();
        Ok(freed)
    }

    /// Extend a cell one column to the right. `Ok(false)` at the table
    /// edge. The absorbed slots keep their data until a shrink reveals it.
    pub fn grow_cell(&mut self, pos: CellPos) -> Result<bool, TableError> {
        if !self.check_grow(pos)? {
            return Ok(false);
        }
        if let Some(cell) = self.slot_mut(pos) {
            cell.colspan += 1;
        }
        self.rebuild_coverage();
        Ok(true)
    }

    /// Whether `grow_cell` would succeed for `pos`.
    pub fn can_grow(&self, pos: CellPos) -> bool {
        matches!(self.check_grow(pos), Ok(true))
    }

    fn check_grow(&self, pos: CellPos) -> Result<bool, TableError> {
        let area = self.span_area(pos).ok_or(TableError::NoSuchCell(pos))?;
        let next_col = area.end_col + 1;
        if next_col >= self.column_count() {
            return Ok(false);
        }
        for row in area.start_row..=area.end_row {
            let neighbor = CellPos::new(row, next_col);
            let Some(slot) = self.slot(neighbor) else {
                return Ok(false);
            };
            let claimed = matches!(self.coverage(neighbor), Some(Coverage::Owner(_)));
            if claimed || slot.is_merged() {
                return Err(TableError::GrowBlocked { cell: pos, neighbor });
            }
        }
        Ok(true)
    }

    /// Give back the rightmost spanned column. `Ok(false)` at colspan 1.
    pub fn shrink_cell(&mut self, pos: CellPos) -> Result<bool, TableError> {
        let area = self.span_area(pos).ok_or(TableError::NoSuchCell(pos))?;
        if area.width() == 1 {
            return Ok(false);
        }
        for row in area.start_row..=area.end_row {
            if let Some(slot) = self.slot_mut(CellPos::new(row, area.end_col)) {
                slot.reset_span();
            }
        }
        if let Some(cell) = self.slot_mut(pos) {
            cell.colspan -= 1;
        }
        self.rebuild_coverage();
        Ok(true)
    }

    // =========================================================================
    // Validation and repair
    // =========================================================================

    pub fn validate_table_structure(&self) -> ValidationReport {
        let expected = self.column_count();
        let rows = self.row_count();
        let mut issues = Vec::new();

        if expected == 0 {
            issues.push("Table has no columns".to_string());
        }

        for r in 0..rows {
            let len = self.literal_len(r);
            if len == 0 {
                issues.push(format!("Row {} has no cells", r + 1));
                continue;
            }
            let all_orphaned = (0..len)
                .all(|c| self.coverage(CellPos::new(r, c)) == Some(Coverage::Orphaned));
            if all_orphaned {
                issues.push(format!("Row {} contains only merged placeholders", r + 1));
            }
            let width = self.visible_width(r);
            if width != expected {
                issues.push(format!("Row {} spans {width} columns, expected {expected}", r + 1));
            }
        }

        let mut lens: Vec<usize> = (0..rows).map(|r| self.literal_len(r)).collect();
        lens.sort_unstable();
        lens.dedup();
        if lens.len() > 1 || lens.first().is_some_and(|len| *len != expected) {
            let lens: Vec<String> = lens.iter().map(usize::to_string).collect();
            issues.push(format!(
                "Rows have inconsistent cell counts ({}), expected {expected}",
                lens.join(", ")
            ));
        }

        for span in self.spans() {
            if span.pos.col + span.colspan > expected || span.pos.row + span.rowspan > rows {
                issues.push(format!("Cell {} spans past the table edge", span.pos));
            }
        }

        let overlaps = self.overlapping_slots();
        if !overlaps.is_empty() {
            issues.push(format!("{} cells are covered by more than one merge", overlaps.len()));
        }

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
            expected_columns: expected,
        }
    }

    /// Destructive repair: drop every merge, square all rows to the widest
    /// row (at least two columns) and reset column widths.
    ///
    /// The target width counts every literal cell. Orphaned placeholders
    /// hold stale data and are emptied.
    pub fn fix_table_structure(&mut self) -> ValidationReport {
        let target = self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0).max(2);
        for pos in self.orphans() {
            if let Some(slot) = self.slot_mut(pos) {
                *slot = Cell::default();
            }
        }
        self.clear_coverage();
        let mut padded = 0;

        for row in &mut self.rows {
            for cell in &mut row.cells {
                cell.reset_span();
            }
            padded += target - row.cells.len();
            row.cells.resize_with(target, Cell::default);
        }
        self.column_widths = vec!["auto".to_string(); target];
        self.rebuild_coverage();
        log::info!("repaired table: {target} columns, {padded} cells padded");
        self.validate_table_structure()
    }
}
