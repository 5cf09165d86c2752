use gridtable_core::CellPos;

/// Per-table edit state. At most one cell is editable at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Cells are locked; pointer input drives selection.
    #[default]
    Locked,
    /// Text input goes to this cell.
    Editing(CellPos),
}

impl EditMode {
    pub fn editing_cell(&self) -> Option<CellPos> {
        match self {
            EditMode::Locked => None,
            EditMode::Editing(pos) => Some(*pos),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditMode::Editing(_))
    }

    /// Keybinding context name.
    pub fn context(&self) -> &'static str {
        match self {
            EditMode::Locked => "locked",
            EditMode::Editing(_) => "editing",
        }
    }

    /// Start editing `pos`. Returns the cell that was being edited before,
    /// which the caller must commit first.
    pub fn enter(&mut self, pos: CellPos) -> Option<CellPos> {
        let previous = self.editing_cell().filter(|p| *p != pos);
        *self = EditMode::Editing(pos);
        previous
    }

    /// Back to locked. Returns the cell that was being edited.
    pub fn exit(&mut self) -> Option<CellPos> {
        let previous = self.editing_cell();
        *self = EditMode::Locked;
        previous
    }
}
