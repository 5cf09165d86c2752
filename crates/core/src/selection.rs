use crate::range::{CellPos, Range};

/// A rendered cell as the surface lays it out: anchor position plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: CellPos,
    pub rowspan: usize,
    pub colspan: usize,
}

impl Placement {
    pub fn new(pos: CellPos, rowspan: usize, colspan: usize) -> Self {
        Self { pos, rowspan: rowspan.max(1), colspan: colspan.max(1) }
    }

    /// Grid area occupied by this cell.
    pub fn area(&self) -> Range {
        Range::from_span(self.pos, self.rowspan, self.colspan)
    }
}

/// Every rendered cell whose area touches the rectangle spanned by `start`
/// and `end`, in row-major order of anchors.
///
/// Rows and columns are bounded independently, so a drag from (0,2) to
/// (2,0) selects the same 3x3 block as one from (0,0) to (2,2). A merged
/// cell that only partially overlaps the block is still included whole.
pub fn cells_in_rect(start: CellPos, end: CellPos, layout: &[Placement]) -> Vec<CellPos> {
    let rect = Range::between(start, end);
    let mut cells: Vec<CellPos> = layout
        .iter()
        .filter(|p| p.area().intersects(&rect))
        .map(|p| p.pos)
        .collect();
    cells.sort();
    cells.dedup();
    cells
}

/// Drag/shift-click selection state.
///
/// `active` is true between pointer-down and pointer-up; only then do
/// drag updates change the selected cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: bool,
    start: Option<CellPos>,
    end: Option<CellPos>,
    cells: Vec<CellPos>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer-down: drop the previous selection and anchor a new one.
    pub fn start(&mut self, cell: CellPos) {
        self.active = true;
        self.start = Some(cell);
        self.end = Some(cell);
        self.cells = vec![cell];
    }

    /// Drag: recompute the rectangle between the anchor and `cell`.
    /// Returns true if the selected cells changed.
    pub fn update(&mut self, cell: CellPos, layout: &[Placement]) -> bool {
        if !self.active {
            return false;
        }
        self.extend_to(cell, layout)
    }

    /// Shift-click: extend from the anchor regardless of drag state.
    /// With no anchor this behaves like `start` followed by `finish`.
    pub fn extend_to(&mut self, cell: CellPos, layout: &[Placement]) -> bool {
        let Some(anchor) = self.start else {
            self.start(cell);
            self.active = false;
            return true;
        };
        self.end = Some(cell);
        let cells = cells_in_rect(anchor, cell, layout);
        if cells == self.cells {
            return false;
        }
        self.cells = cells;
        true
    }

    /// Pointer-up: stop tracking drags, keep the cells.
    pub fn finish(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the selection with an explicit list (programmatic selection).
    pub fn set_cells(&mut self, mut cells: Vec<CellPos>) {
        cells.sort();
        cells.dedup();
        self.active = false;
        self.start = cells.first().copied();
        self.end = cells.last().copied();
        self.cells = cells;
    }

    /// Re-resolve the selection against a freshly rendered layout.
    /// Positions that are no longer rendered are dropped silently.
    /// Returns true if anything was dropped.
    pub fn retain_rendered(&mut self, layout: &[Placement]) -> bool {
        let before = self.cells.len();
        self.cells.retain(|pos| layout.iter().any(|p| p.pos == *pos));
        let rendered = |pos: &Option<CellPos>| {
            pos.map(|pos| layout.iter().any(|p| p.pos == pos)).unwrap_or(false)
        };
        if !rendered(&self.start) {
            self.start = self.cells.first().copied();
        }
        if !rendered(&self.end) {
            self.end = self.cells.last().copied();
        }
        if self.cells.is_empty() {
            self.active = false;
        }
        self.cells.len() != before
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start_cell(&self) -> Option<CellPos> {
        self.start
    }

    pub fn end_cell(&self) -> Option<CellPos> {
        self.end
    }

    pub fn cells(&self) -> &[CellPos] {
        &self.cells
    }

    pub fn first(&self) -> Option<CellPos> {
        self.cells.first().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        self.cells.contains(&pos)
    }
}
