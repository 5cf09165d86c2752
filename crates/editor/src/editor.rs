//! The table editor: owns one document and funnels every input through it.
//!
//! Pointer events drive the selection, commands and keys drive the engine,
//! and every successful mutation ends the same way: record history,
//! re-render, re-resolve the selection, notify listeners, publish toolbar
//! state. A refused action leaves the document exactly as it was and turns
//! into a status message.

use serde_json::{json, Value};

use gridtable_config::{EditorSettings, Keybindings};
use gridtable_core::{CellPos, SelectionState};
use gridtable_engine::{
    BorderSpec, Clipboard, ClipboardMode, ExportDocument, GridDocument, History, ImportMode, Link,
    RichText, TableError,
};

use crate::commands::{Command, CommandError, LinkRequest, TableFlag, TextSpan};
use crate::edit_mode::EditMode;
use crate::events::{EditorEvent, EventCallback};
use crate::registry::{EditorId, SharedRegistry};
use crate::surface::{render_list, PointerEvent, Rect, Surface};
use crate::toolbar::{EditorFacts, ToolbarState};

pub struct TableEditor<S: Surface> {
    doc: GridDocument,
    surface: S,
    selection: SelectionState,
    edit_mode: EditMode,
    clipboard: Clipboard,
    history: History,
    settings: EditorSettings,
    keybindings: Keybindings,
    listeners: Vec<EventCallback>,
    status: Option<String>,
    registry: Option<(SharedRegistry, EditorId)>,
}

impl<S: Surface> TableEditor<S> {
    /// Editor over externally supplied (possibly legacy) config, with
    /// default settings and keybindings.
    pub fn new(config: &Value, surface: S) -> Self {
        Self::with_config(
            GridDocument::normalize(config),
            surface,
            EditorSettings::default(),
            Keybindings::default(),
        )
    }

    pub fn with_config(
        doc: GridDocument,
        surface: S,
        settings: EditorSettings,
        keybindings: Keybindings,
    ) -> Self {
        let mut editor = Self {
            doc,
            surface,
            selection: SelectionState::new(),
            edit_mode: EditMode::Locked,
            clipboard: Clipboard::new(),
            history: History::with_limit(settings.history_limit),
            settings,
            keybindings,
            listeners: Vec::new(),
            status: None,
            registry: None,
        };
        editor.render();
        editor
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &GridDocument {
        &self.doc
    }

    pub fn export(&self) -> ExportDocument {
        self.doc.to_export_form()
    }

    pub fn selection(&self) -> &[CellPos] {
        self.selection.cells()
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    /// Last user-facing message; cleared by the next successful mutation.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Tab-separated rendering of the clipboard for the system clipboard.
    pub fn clipboard_text(&self) -> String {
        self.clipboard.to_tsv()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&EditorEvent) -> Result<(), String> + 'static) {
        self.listeners.push(Box::new(callback));
    }

    // =========================================================================
    // Toolbar registry
    // =========================================================================

    /// Register with a shared toolbar registry. Replaces any earlier registration.
    pub fn attach_registry(&mut self, registry: SharedRegistry) -> EditorId {
        self.detach_registry();
        let id = registry.borrow_mut().register();
        self.registry = Some((registry, id));
        self.publish_state();
        id
    }

    pub fn detach_registry(&mut self) {
        if let Some((registry, id)) = self.registry.take() {
            if let Ok(mut reg) = registry.try_borrow_mut() {
                reg.unregister(id);
            }
        }
    }

    pub fn editor_id(&self) -> Option<EditorId> {
        self.registry.as_ref().map(|(_, id)| *id)
    }

    /// The user interacted with this table: the shared toolbar now drives it.
    pub fn focus(&mut self) {
        if let Some((registry, id)) = &self.registry {
            registry.borrow_mut().activate(*id);
        }
        self.publish_state();
    }

    /// Run the commands the shared toolbar queued for this editor.
    pub fn process_toolbar_commands(&mut self) -> usize {
        let commands = match &self.registry {
            Some((registry, id)) => registry.borrow_mut().take_commands(*id),
            None => return 0,
        };
        let count = commands.len();
        for (command, value) in commands {
            self.handle_command(&command, &value);
        }
        count
    }

    // =========================================================================
    // External config
    // =========================================================================

    /// Replace the document from an external config update. History and
    /// clipboard are dropped; no change notification is sent back.
    pub fn load(&mut self, config: &Value) {
        self.doc = GridDocument::normalize(config);
        self.history.clear();
        self.clipboard.clear();
        if self.edit_mode.exit().is_some() {
            self.surface.set_editing(None);
        }
        self.render();
        self.publish_state();
    }

    pub fn apply_import(&mut self, imported: GridDocument, mode: ImportMode) {
        if mode == ImportMode::Append && imported.column_count() != self.doc.column_count() {
            log::warn!(
                "appending {} columns onto a {}-column table",
                imported.column_count(),
                self.doc.column_count()
            );
        }
        let label = match mode {
            ImportMode::Replace => "Import",
            ImportMode::Append => "Append import",
        };
        self.mutate(label, move |ed| {
            ed.doc.apply_import(imported, mode);
            Ok(())
        });
    }

    // =========================================================================
    // Selection and pointer input
    // =========================================================================

    pub fn pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { pos, shift } => {
                let Some(owner) = self.doc.owner_of(pos) else {
                    return;
                };
                match self.edit_mode.editing_cell() {
                    Some(editing) if editing == owner => return,
                    Some(_) => self.exit_edit(),
                    None => {}
                }
                let layout = self.doc.placements();
                if shift {
                    self.selection.extend_to(owner, &layout);
                } else {
                    self.selection.start(owner);
                }
                self.selection_changed();
            }
            PointerEvent::Drag { pos } => {
                let Some(owner) = self.doc.owner_of(pos) else {
                    return;
                };
                let layout = self.doc.placements();
                if self.selection.update(owner, &layout) {
                    self.selection_changed();
                }
            }
            PointerEvent::Up => self.selection.finish(),
            PointerEvent::DoubleClick { pos } => {
                self.enter_edit(pos);
            }
        }
    }

    /// Select an explicit set of cells (positions resolve to their owners).
    pub fn select(&mut self, cells: &[CellPos]) {
        self.selection.set_cells(self.doc.resolve(cells));
        self.selection_changed();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selection_changed();
    }

    fn selection_changed(&mut self) {
        self.emit(EditorEvent::SelectionChanged(self.selection.cells().to_vec()));
        self.render();
        self.publish_state();
    }

    /// Bounds of the selected cells as the surface lays them out.
    pub fn selection_rect(&self) -> Option<Rect> {
        self.selection
            .cells()
            .iter()
            .filter_map(|pos| self.surface.cell_rect(*pos))
            .reduce(|a, b| a.union(&b))
    }

    /// Where a floating text-format toolbar should sit.
    pub fn floating_toolbar_anchor(&self) -> Option<Rect> {
        let editing = self.edit_mode.editing_cell()?;
        self.surface
            .text_selection_rect()
            .or_else(|| self.surface.cell_rect(editing))
    }

    // =========================================================================
    // Edit mode
    // =========================================================================

    /// Start editing the cell at `pos`. Any other editing cell is exited
    /// first; its text must already have been committed by the surface.
    pub fn enter_edit(&mut self, pos: CellPos) -> bool {
        let Some(owner) = self.doc.owner_of(pos) else {
            return false;
        };
        if self.edit_mode.enter(owner).is_some() {
            log::debug!("leaving previous edit for {owner}");
        }
        self.selection.set_cells(vec![owner]);
        self.surface.set_editing(Some(owner));
        self.emit(EditorEvent::EditModeChanged(Some(owner)));
        self.selection_changed();
        true
    }

    /// Write the editing cell's current HTML back without leaving edit mode.
    pub fn sync_edit(&mut self, html: &str) {
        let Some(pos) = self.edit_mode.editing_cell() else {
            log::debug!("edit sync with no editing cell ignored");
            return;
        };
        if self.doc.cell(pos).is_some_and(|cell| cell.content == html) {
            return;
        }
        let html = html.to_string();
        self.mutate("Edit cell", move |ed| {
            let cell = ed.doc.cell_mut(pos).ok_or(TableError::NoSuchCell(pos))?;
            cell.content = html;
            Ok(())
        });
    }

    /// Commit the editing cell's HTML and lock it.
    pub fn commit_edit(&mut self, html: &str) {
        self.sync_edit(html);
        self.exit_edit();
    }

    pub fn exit_edit(&mut self) {
        if self.edit_mode.exit().is_some() {
            self.surface.set_editing(None);
            self.emit(EditorEvent::EditModeChanged(None));
            self.render();
            self.publish_state();
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Entry point of the command protocol. Unknown commands are ignored.
    pub fn handle_command(&mut self, name: &str, value: &Value) {
        match Command::parse(name, value) {
            Ok(command) => self.execute(command),
            Err(CommandError::Unknown(name)) => log::debug!("ignoring unknown command '{name}'"),
            Err(err) => self.report(err.to_string()),
        }
    }

    /// Run the command bound to `key` in the current edit context.
    /// Returns false when the key is not bound.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let context = self.edit_mode.context();
        let Some(command) = self.keybindings.command_for(key, Some(context)).map(str::to_string) else {
            return false;
        };
        log::debug!("key {key} -> {command}");
        self.handle_command(&command, &Value::Null);
        true
    }

    pub fn execute(&mut self, command: Command) {
        let cells = self.selection.cells().to_vec();
        let first = cells.first().copied();

        match command {
            Command::AddRow(position) => {
                self.mutate("Add row", |ed| ed.doc.add_row(position));
            }
            Command::RemoveRow(index) => match index.or(first.map(|p| p.row)) {
                Some(index) => {
                    self.mutate("Remove row", |ed| ed.doc.remove_row(index));
                }
                None => self.report(TableError::EmptySelection.to_string()),
            },
            Command::AddColumn(position) => {
                let width = self.settings.default_column_width.clone();
                self.mutate("Add column", |ed| ed.doc.add_column_with_width(position, &width));
            }
            Command::RemoveColumn(index) => match index.or(first.map(|p| p.col)) {
                Some(index) => {
                    self.mutate("Remove column", |ed| ed.doc.remove_column(index));
                }
                None => self.report(TableError::EmptySelection.to_string()),
            },
            Command::SetColumnWidth { index, width } => match index.or(first.map(|p| p.col)) {
                Some(index) => {
                    self.mutate("Column width", |ed| ed.doc.set_column_width(index, &width));
                }
                None => self.report(TableError::EmptySelection.to_string()),
            },
            Command::SetRowHeight { index, height } => match index.or(first.map(|p| p.row)) {
                Some(index) => {
                    self.mutate("Row height", |ed| ed.doc.set_row_height(index, height.as_deref()));
                }
                None => self.report(TableError::EmptySelection.to_string()),
            },
            Command::MergeCells => {
                if let Some(owner) = self.mutate("Merge cells", |ed| ed.doc.merge_cells(&cells)) {
                    self.select(&[owner]);
                }
            }
            Command::SplitCell => {
                let Some(pos) = first else {
                    return self.report(TableError::EmptySelection.to_string());
                };
                if let Some(freed) = self.mutate("Split cell", |ed| ed.doc.split_cell(pos)) {
                    let mut cells = vec![pos];
                    cells.extend(freed);
                    self.select(&cells);
                }
            }
            Command::GrowCell | Command::ShrinkCell => {
                let Some(pos) = first else {
                    return self.report(TableError::EmptySelection.to_string());
                };
                let changed = if command == Command::GrowCell {
                    self.mutate("Grow cell", |ed| ed.doc.grow_cell(pos))
                } else {
                    self.mutate("Shrink cell", |ed| ed.doc.shrink_cell(pos))
                };
                if changed == Some(false) {
                    log::debug!("{pos} is already at the edge");
                }
            }
            Command::SetCellType(content_type) => {
                self.mutate("Cell type", |ed| ed.doc.set_cell_type(&cells, content_type));
            }
            Command::Bold => {
                self.mutate("Bold", |ed| ed.doc.apply_cell_bold(&cells));
            }
            Command::Italic => {
                self.mutate("Italic", |ed| ed.doc.apply_cell_italic(&cells));
            }
            Command::Underline => {
                self.mutate("Underline", |ed| ed.doc.apply_cell_underline(&cells));
            }
            Command::Align(alignment) => {
                self.mutate("Align", |ed| ed.doc.set_alignment(&cells, alignment));
            }
            Command::VerticalAlign(alignment) => {
                self.mutate("Vertical align", |ed| ed.doc.set_vertical_alignment(&cells, alignment));
            }
            Command::FontStyle(style) => {
                self.mutate("Font style", |ed| ed.doc.apply_font_style(&cells, style));
            }
            Command::SetBorders { sides, border } => {
                let border = border.unwrap_or_else(|| self.default_border());
                self.mutate("Borders", |ed| ed.doc.set_borders(&cells, sides, &border));
            }
            Command::SetColor { color_type, value } => {
                self.mutate("Color", |ed| ed.doc.set_colors(&cells, color_type, value.as_deref()));
            }
            Command::SetCssClass(class) => {
                self.mutate("CSS class", |ed| ed.doc.set_css_class(&cells, &class));
            }
            Command::ToggleGrid => {
                self.mutate("Toggle grid", |ed| {
                    ed.doc.show_borders = !ed.doc.show_borders;
                    Ok(())
                });
            }
            Command::OpenImport => self.emit(EditorEvent::ImportRequested),
            Command::Copy | Command::Cut => {
                let result = if command == Command::Cut {
                    self.clipboard.cut(&self.doc, &cells)
                } else {
                    self.clipboard.copy(&self.doc, &cells)
                };
                match result {
                    Ok(count) => {
                        log::debug!("{count} cells on the clipboard ({:?})", self.clipboard.mode());
                        self.render();
                        self.publish_state();
                    }
                    Err(err) => self.report(err.to_string()),
                }
            }
            Command::Paste => {
                if let Some(pasted) = self.mutate("Paste", |ed| ed.clipboard.paste(&mut ed.doc, &cells)) {
                    self.select(&pasted);
                }
            }
            Command::ClearCells => {
                self.mutate("Clear cells", |ed| ed.doc.clear_cells(&cells));
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::FixStructure { confirmed } => {
                if self.settings.repair_requires_confirmation && !confirmed {
                    self.report("Repair clears every merge and may drop cells; confirm to continue".into());
                    return;
                }
                if let Some(report) = self.mutate("Fix structure", |ed| Ok(ed.doc.fix_table_structure())) {
                    if !report.is_valid {
                        self.report(report.issues.join("; "));
                    }
                }
            }
            Command::SetImage { url, alt } => {
                let Some(pos) = first else {
                    return self.report(TableError::EmptySelection.to_string());
                };
                self.mutate("Image", |ed| ed.doc.set_image(pos, &url, &alt));
            }
            Command::InsertLink(None) => match self.edit_mode.editing_cell() {
                Some(pos) => self.emit(EditorEvent::LinkRequested(pos)),
                None => self.report("Double-click a cell to edit it before inserting a link".into()),
            },
            Command::InsertLink(Some(request)) => self.insert_link(request),
            Command::RemoveLink(span) => self.remove_link(span),
            Command::SetCaption(caption) => {
                self.mutate("Caption", |ed| {
                    ed.doc.caption = caption;
                    Ok(())
                });
            }
            Command::SetTableFlag { flag, value } => {
                self.mutate("Table option", |ed| {
                    let field = match flag {
                        TableFlag::ShowBorders => &mut ed.doc.show_borders,
                        TableFlag::StripedRows => &mut ed.doc.striped_rows,
                        TableFlag::HoverEffect => &mut ed.doc.hover_effect,
                        TableFlag::Responsive => &mut ed.doc.responsive,
                    };
                    *field = value;
                    Ok(())
                });
            }
            Command::EditCell => match first {
                Some(pos) => {
                    self.enter_edit(pos);
                }
                None => self.report(TableError::EmptySelection.to_string()),
            },
            Command::ExitEdit => self.exit_edit(),
            Command::ClearSelection => self.clear_selection(),
        }
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        let facts = EditorFacts {
            editing: self.edit_mode.editing_cell(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            clipboard: (!self.clipboard.is_empty()).then(|| self.clipboard.mode()),
        };
        ToolbarState::compute(&self.doc, self.selection.cells(), facts)
    }

    pub fn undo(&mut self) {
        match self.history.undo(&mut self.doc) {
            Ok(label) => {
                log::debug!("undo: {label}");
                self.committed();
            }
            Err(err) => self.report(err.to_string()),
        }
    }

    pub fn redo(&mut self) {
        match self.history.redo(&mut self.doc) {
            Ok(label) => {
                log::debug!("redo: {label}");
                self.committed();
            }
            Err(err) => self.report(err.to_string()),
        }
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Link a char range of the editing cell's text, or insert new linked
    /// text when the request carries `text`.
    pub fn insert_link(&mut self, request: LinkRequest) {
        let Some(pos) = self.edit_mode.editing_cell() else {
            return self.report("Double-click a cell to edit it before inserting a link".into());
        };
        let href = request.href.trim().to_string();
        if href.is_empty() {
            return self.report("Enter a link address".into());
        }
        let target = request
            .target
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| self.settings.link_target().map(str::to_string));
        let link = Link { href, target };

        self.mutate("Insert link", move |ed| {
            let cell = ed.doc.cell_mut(pos).ok_or(TableError::NoSuchCell(pos))?;
            let mut rich = RichText::from_html(&cell.content);
            let len = rich.char_len();
            let start = request.start.unwrap_or(0);
            let end = request.end.unwrap_or(len);
            if start > end || end > len {
                return Err(TableError::InvalidTextRange { start, end, len });
            }
            match request.text.filter(|t| !t.is_empty()) {
                Some(text) => {
                    let mut marks = rich.marks_at(start);
                    marks.link = Some(link);
                    rich.replace_range(start..end, &text, marks);
                }
                None if start == end => return Err(TableError::InvalidTextRange { start, end, len }),
                None => rich.set_link(start..end, Some(link)),
            }
            cell.content = rich.to_html();
            Ok(())
        });
    }

    /// Unlink a char range (the whole text by default) of the editing cell.
    pub fn remove_link(&mut self, span: TextSpan) {
        let Some(pos) = self.edit_mode.editing_cell() else {
            return self.report("Double-click a cell to edit it before removing a link".into());
        };
        self.mutate("Remove link", move |ed| {
            let cell = ed.doc.cell_mut(pos).ok_or(TableError::NoSuchCell(pos))?;
            let mut rich = RichText::from_html(&cell.content);
            let len = rich.char_len();
            let start = span.start.unwrap_or(0);
            let end = span.end.unwrap_or(len);
            if start > end || end > len {
                return Err(TableError::InvalidTextRange { start, end, len });
            }
            rich.set_link(start..end, None);
            cell.content = rich.to_html();
            Ok(())
        });
    }

    // =========================================================================
    // Mutation funnel
    // =========================================================================

    /// Run `op` against the editor. On success the pre-change document goes
    /// on the undo stack and the change is committed; on failure the
    /// document is restored and the error becomes a status message.
    fn mutate<T>(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut Self) -> Result<T, TableError>,
    ) -> Option<T> {
        let before = self.doc.clone();
        match op(self) {
            Ok(value) => {
                if self.doc != before {
                    self.history.record(label, before);
                    self.committed();
                } else {
                    self.render();
                    self.publish_state();
                }
                Some(value)
            }
            Err(err) => {
                self.doc = before;
                self.report(err.to_string());
                None
            }
        }
    }

    fn committed(&mut self) {
        self.status = None;
        self.render();
        self.emit(EditorEvent::DocumentChanged(self.doc.to_export_form()));
        self.publish_state();
    }

    /// Re-render and re-resolve the selection against the new layout.
    fn render(&mut self) {
        let layout = self.doc.placements();
        if self.selection.retain_rendered(&layout) {
            log::debug!("selection trimmed to {} rendered cells", self.selection.len());
            self.emit(EditorEvent::SelectionChanged(self.selection.cells().to_vec()));
        }
        if let Some(editing) = self.edit_mode.editing_cell() {
            if !layout.iter().any(|p| p.pos == editing) {
                self.edit_mode.exit();
                self.surface.set_editing(None);
                self.emit(EditorEvent::EditModeChanged(None));
            }
        }

        let cut = match self.clipboard.mode() {
            ClipboardMode::Cut => self.clipboard.cut_sources(),
            ClipboardMode::Copy => Vec::new(),
        };
        let cells = render_list(&self.doc, self.selection.cells(), self.edit_mode.editing_cell(), &cut);
        log::debug!("rendering {} cells", cells.len());
        self.surface.render(&cells);
        self.surface.set_cut_marks(&cut);
    }

    fn publish_state(&mut self) {
        if let Some((registry, id)) = &self.registry {
            let state = self.toolbar_state();
            registry.borrow_mut().publish(*id, state);
        }
    }

    fn report(&mut self, message: String) {
        log::warn!("{message}");
        self.status = Some(message.clone());
        self.emit(EditorEvent::Status(message));
    }

    fn emit(&mut self, event: EditorEvent) {
        let mut failures = Vec::new();
        for listener in &mut self.listeners {
            if let Err(err) = listener(&event) {
                failures.push(err);
            }
        }
        for err in failures {
            log::warn!("change listener failed: {err}");
            self.status = Some(format!("Could not save table changes: {err}"));
        }
    }

    fn default_border(&self) -> BorderSpec {
        BorderSpec::from_json(&json!({
            "width": self.settings.border_width,
            "style": self.settings.border_style,
            "color": self.settings.border_color,
        }))
        .unwrap_or_default()
    }
}

impl<S: Surface> Drop for TableEditor<S> {
    fn drop(&mut self) {
        self.detach_registry();
    }
}
