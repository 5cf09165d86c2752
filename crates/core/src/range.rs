use serde::{Deserialize, Serialize};

/// Logical address of a grid slot. `col` is the literal index inside the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset this position by a signed delta. Returns None when it would leave the grid.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Some(Self { row, col })
    }
}

impl From<(usize, usize)> for CellPos {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}C{}", self.row + 1, self.col + 1)
    }
}

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(pos: CellPos) -> Self {
        Self {
            start_row: pos.row,
            start_col: pos.col,
            end_row: pos.row,
            end_col: pos.col,
        }
    }

    /// Range covered by a cell anchored at `pos` with the given spans (both >= 1).
    pub fn from_span(pos: CellPos, rowspan: usize, colspan: usize) -> Self {
        Self {
            start_row: pos.row,
            start_col: pos.col,
            end_row: pos.row.saturating_add(rowspan.max(1) - 1),
            end_col: pos.col.saturating_add(colspan.max(1) - 1),
        }
    }

    /// Smallest range containing both corner positions.
    pub fn between(a: CellPos, b: CellPos) -> Self {
        Self::new(a.row, a.col, b.row, b.col)
    }

    pub fn top_left(&self) -> CellPos {
        CellPos::new(self.start_row, self.start_col)
    }

    pub fn bottom_right(&self) -> CellPos {
        CellPos::new(self.end_row, self.end_col)
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row >= self.start_row && pos.row <= self.end_row &&
        pos.col >= self.start_col && pos.col <= self.end_col
    }

    /// True when `other` lies completely inside this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        other.start_row >= self.start_row && other.end_row <= self.end_row &&
        other.start_col >= self.start_col && other.end_col <= self.end_col
    }

    pub fn intersects(&self, other: &Range) -> bool {
        self.start_row <= other.end_row && other.start_row <= self.end_row &&
        self.start_col <= other.end_col && other.start_col <= self.end_col
    }

    /// Bounding range of both.
    pub fn union(&self, other: &Range) -> Range {
        Range {
            start_row: self.start_row.min(other.start_row),
            start_col: self.start_col.min(other.start_col),
            end_row: self.end_row.max(other.end_row),
            end_col: self.end_col.max(other.end_col),
        }
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = CellPos> {
        let start_row = self.start_row;
        let end_row = self.end_row;
        let start_col = self.start_col;
        let end_col = self.end_col;

        (start_row..=end_row).flat_map(move |r| {
            (start_col..=end_col).map(move |c| CellPos::new(r, c))
        })
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// Bounding range of a set of positions. None for an empty set.
    pub fn bounding<I: IntoIterator<Item = CellPos>>(positions: I) -> Option<Range> {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Range::single(first), |acc, pos| acc.union(&Range::single(pos))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let r = Range::new(3, 4, 1, 2);
        assert_eq!(r.top_left(), CellPos::new(1, 2));
        assert_eq!(r.height(), 3);
        assert_eq!(r.width(), 3);
        assert_eq!(r.cell_count(), 9);
    }

    #[test]
    fn test_from_span_clamps_zero() {
        let r = Range::from_span(CellPos::new(2, 2), 0, 3);
        assert_eq!(r.height(), 1);
        assert_eq!(r.end_col, 4);
    }

    #[test]
    fn test_from_span_saturates() {
        let r = Range::from_span(CellPos::new(1, 5), usize::MAX, usize::MAX);
        assert_eq!((r.end_row, r.end_col), (usize::MAX, usize::MAX));
        assert_eq!(r.start_col, 5);
    }

    #[test]
    fn test_cells_row_major() {
        let cells: Vec<_> = Range::new(0, 0, 1, 1).cells().collect();
        assert_eq!(
            cells,
            vec![CellPos::new(0, 0), CellPos::new(0, 1), CellPos::new(1, 0), CellPos::new(1, 1)]
        );
    }

    #[test]
    fn test_intersects_and_contains() {
        let a = Range::new(0, 0, 2, 2);
        let b = Range::new(2, 2, 3, 3);
        let c = Range::new(3, 0, 4, 1);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_range(&Range::new(1, 1, 2, 2)));
        assert!(!a.contains_range(&b));
    }

    #[test]
    fn test_bounding() {
        let r = Range::bounding([CellPos::new(1, 3), CellPos::new(0, 1), CellPos::new(2, 2)]).unwrap();
        assert_eq!(r, Range::new(0, 1, 2, 3));
        assert!(Range::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn test_offset_rejects_negative() {
        assert_eq!(CellPos::new(1, 1).offset(-1, 2), Some(CellPos::new(0, 3)));
        assert_eq!(CellPos::new(0, 1).offset(-1, 0), None);
    }
}
