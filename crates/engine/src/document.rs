//! The grid document: canonical table data plus derived merge coverage.
//!
//! Rows are stored as a literal grid: the cell at literal index `c` of row
//! `r` is grid column `c`. A slot covered by another cell's span keeps a
//! placeholder `Cell` whose data is stale; whether a slot is covered is
//! answered by the coverage map, never by the cell itself.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gridtable_core::{CellPos, Placement, Range};

use crate::cell::{
    Alignment, Cell, CellBorders, ContentType, FontStyle, ImageData, VerticalAlignment,
};
use crate::rich_text;

/// Why a slot is not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Covered by the span of the cell at this position.
    Owner(CellPos),
    /// Flagged as merged in loaded config, but no span reaches it.
    Orphaned,
}

/// How imported rows are combined with the current document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Replace,
    Append,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl Row {
    /// A row of `cols` default cells.
    pub fn blank(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| Cell::default()).collect(),
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridDocument {
    pub rows: Vec<Row>,
    /// Single source of truth for the column count.
    pub column_widths: Vec<String>,
    pub caption: String,
    pub show_borders: bool,
    pub striped_rows: bool,
    pub hover_effect: bool,
    pub responsive: bool,
    pub table_width: String,
    coverage: FxHashMap<CellPos, Coverage>,
}

/// The document as handed to the widget config store: covered slots removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub rows: Vec<Row>,
    pub column_widths: Vec<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default = "default_true")]
    pub show_borders: bool,
    #[serde(default)]
    pub striped_rows: bool,
    #[serde(default)]
    pub hover_effect: bool,
    #[serde(default = "default_true")]
    pub responsive: bool,
    #[serde(default = "default_table_width")]
    pub table_width: String,
}

fn default_true() -> bool {
    true
}

fn default_table_width() -> String {
    "100%".to_string()
}

impl Default for GridDocument {
    fn default() -> Self {
        Self::default_table()
    }
}

impl GridDocument {
    /// An empty `rows` x `cols` table with default table flags.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows: (0..rows).map(|_| Row::blank(cols)).collect(),
            column_widths: vec!["auto".to_string(); cols],
            caption: String::new(),
            show_borders: true,
            striped_rows: false,
            hover_effect: false,
            responsive: true,
            table_width: default_table_width(),
            coverage: FxHashMap::default(),
        }
    }

    /// The built-in 2x2 table used when config is empty or malformed.
    pub fn default_table() -> Self {
        Self::new(2, 2)
    }

    /// Build a document from external (possibly legacy or partial) config.
    ///
    /// Input with `_merged` placeholders is taken as a literal grid. Input
    /// without them is taken as export form and laid out the way an HTML
    /// table is, inserting placeholders for covered slots.
    pub fn normalize(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::default_table();
        };
        let Some(raw_rows) = obj.get("rows").and_then(Value::as_array) else {
            return Self::default_table();
        };
        if raw_rows.is_empty() {
            return Self::default_table();
        }

        let parsed: Vec<ParsedRow> = raw_rows.iter().map(parse_row).collect();
        let editor_form = parsed.iter().any(|row| row.cells.iter().any(|(_, merged)| *merged));

        let (rows, orphans) = if editor_form {
            let mut orphans = FxHashSet::default();
            let row_count = parsed.len();
            let rows = parsed
                .into_iter()
                .enumerate()
                .map(|(r, row)| {
                    let width = row.cells.len();
                    let cells = row
                        .cells
                        .into_iter()
                        .enumerate()
                        .map(|(c, (mut cell, merged))| {
                            if merged {
                                orphans.insert(CellPos::new(r, c));
                            }
                            // A literal span never reaches past the grid.
                            cell.colspan = cell.colspan.min(width - c);
                            cell.rowspan = cell.rowspan.min(row_count - r);
                            cell
                        })
                        .collect();
                    Row { cells, height: row.height }
                })
                .collect();
            (rows, orphans)
        } else {
            (place_rows(parsed), FxHashSet::default())
        };

        let longest = rows.iter().map(|r: &Row| r.cells.len()).max().unwrap_or(0);
        let column_widths = match obj.get("columnWidths").and_then(Value::as_array) {
            Some(widths) if !widths.is_empty() => widths.iter().map(width_spec).collect(),
            _ => vec!["auto".to_string(); longest.max(1)],
        };

        let mut doc = Self {
            rows,
            column_widths,
            caption: obj.get("caption").and_then(Value::as_str).unwrap_or("").to_string(),
            show_borders: obj.get("showBorders").and_then(Value::as_bool).unwrap_or(true),
            striped_rows: obj.get("stripedRows").and_then(Value::as_bool).unwrap_or(false),
            hover_effect: obj.get("hoverEffect").and_then(Value::as_bool).unwrap_or(false),
            responsive: obj.get("responsive").and_then(Value::as_bool).unwrap_or(true),
            table_width: obj
                .get("tableWidth")
                .map(width_spec)
                .unwrap_or_else(default_table_width),
            coverage: FxHashMap::default(),
        };
        // Orphans are legacy placeholders no span reaches; every flagged
        // slot a span does reach is resolved to its owner below.
        let (coverage, conflicts) = compute_coverage(&doc.rows, &orphans);
        if !conflicts.is_empty() {
            log::warn!("loaded table has {} overlapping merged slots", conflicts.len());
        }
        doc.coverage = coverage;
        doc
    }

    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::normalize(&value),
            Err(e) => {
                log::warn!("table config is not valid JSON ({e}), using default table");
                Self::default_table()
            }
        }
    }

    /// Build from an export-form document (the shape importers produce).
    pub fn from_export(export: ExportDocument) -> Self {
        match serde_json::to_value(&export) {
            Ok(value) => Self::normalize(&value),
            Err(_) => Self::default_table(),
        }
    }

    /// Drop covered slots. The result re-normalizes to this document's layout.
    pub fn to_export_form(&self) -> ExportDocument {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| Row {
                cells: row
                    .cells
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| !self.is_covered(CellPos::new(r, *c)))
                    .map(|(_, cell)| cell.clone())
                    .collect(),
                height: row.height.clone(),
            })
            .collect();
        ExportDocument {
            rows,
            column_widths: self.column_widths.clone(),
            caption: self.caption.clone(),
            show_borders: self.show_borders,
            striped_rows: self.striped_rows,
            hover_effect: self.hover_effect,
            responsive: self.responsive,
            table_width: self.table_width.clone(),
        }
    }

    /// Concatenate another document's rows onto this one. Column agreement
    /// is the caller's responsibility.
    pub fn append_rows(&mut self, other: GridDocument) {
        let offset = self.rows.len();
        let orphans: Vec<CellPos> = other
            .coverage
            .iter()
            .filter(|(_, c)| **c == Coverage::Orphaned)
            .map(|(pos, _)| CellPos::new(pos.row + offset, pos.col))
            .collect();
        self.rows.extend(other.rows);
        for pos in orphans {
            self.coverage.insert(pos, Coverage::Orphaned);
        }
        self.rebuild_coverage();
    }

    /// Take an imported document: replace wholesale, or append its rows.
    pub fn apply_import(&mut self, imported: GridDocument, mode: ImportMode) {
        match mode {
            ImportMode::Replace => *self = imported,
            ImportMode::Append => self.append_rows(imported),
        }
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Literal number of slots in a row, placeholders included.
    pub fn literal_len(&self, row: usize) -> usize {
        self.rows.get(row).map(|r| r.cells.len()).unwrap_or(0)
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.col < self.literal_len(pos.row)
    }

    /// The slot at `pos`, covered or not.
    pub fn slot(&self, pos: CellPos) -> Option<&Cell> {
        self.rows.get(pos.row)?.cells.get(pos.col)
    }

    pub(crate) fn slot_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        self.rows.get_mut(pos.row)?.cells.get_mut(pos.col)
    }

    /// The rendered cell at `pos`. None for covered slots.
    pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
        if self.is_covered(pos) {
            return None;
        }
        self.slot(pos)
    }

    pub fn cell_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        if self.is_covered(pos) {
            return None;
        }
        self.slot_mut(pos)
    }

    pub fn is_covered(&self, pos: CellPos) -> bool {
        self.coverage.contains_key(&pos)
    }

    pub fn coverage(&self, pos: CellPos) -> Option<Coverage> {
        self.coverage.get(&pos).copied()
    }

    /// The rendered cell responsible for `pos`: itself, or the owner of the
    /// span covering it. None outside the grid or for orphaned placeholders.
    pub fn owner_of(&self, pos: CellPos) -> Option<CellPos> {
        if !self.contains(pos) {
            return None;
        }
        match self.coverage.get(&pos) {
            Some(Coverage::Owner(owner)) => Some(*owner),
            Some(Coverage::Orphaned) => None,
            None => Some(pos),
        }
    }

    /// Rendered positions, row-major.
    pub fn owners(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.rows.iter().enumerate().flat_map(move |(r, row)| {
            (0..row.cells.len())
                .map(move |c| CellPos::new(r, c))
                .filter(move |pos| !self.is_covered(*pos))
        })
    }

    /// Rendered cells with their extents, as a surface lays them out.
    pub fn placements(&self) -> Vec<Placement> {
        self.owners()
            .filter_map(|pos| {
                self.slot(pos).map(|cell| Placement::new(pos, cell.rowspan, cell.colspan))
            })
            .collect()
    }

    /// Grid area a rendered cell occupies.
    pub fn span_area(&self, pos: CellPos) -> Option<Range> {
        let cell = self.cell(pos)?;
        Some(Range::from_span(pos, cell.rowspan, cell.colspan))
    }

    /// Resolve arbitrary positions to distinct rendered owners, row-major.
    pub fn resolve(&self, cells: &[CellPos]) -> Vec<CellPos> {
        let mut owners: Vec<CellPos> = cells.iter().filter_map(|p| self.owner_of(*p)).collect();
        owners.sort();
        owners.dedup();
        owners
    }

    /// Columns rendered in `row`: the colspans of every owner whose row
    /// range includes it. Equals `column_count()` in a well-formed table.
    pub fn visible_width(&self, row: usize) -> usize {
        self.owners()
            .filter_map(|pos| self.slot(pos).map(|cell| (pos, cell)))
            .filter(|(pos, cell)| pos.row <= row && row < pos.row + cell.rowspan.max(1))
            .map(|(_, cell)| cell.colspan.max(1))
            .sum()
    }

    /// Plain text of a cell's HTML content.
    pub fn plain_text(&self, pos: CellPos) -> String {
        self.slot(pos)
            .map(|cell| rich_text::RichText::from_html(&cell.content).plain_text())
            .unwrap_or_default()
    }

    // =========================================================================
    // Coverage maintenance
    // =========================================================================

    pub(crate) fn orphans(&self) -> FxHashSet<CellPos> {
        self.coverage
            .iter()
            .filter(|(_, c)| **c == Coverage::Orphaned)
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Recompute coverage from spans, keeping orphaned placeholders.
    /// Returns slots claimed by more than one span.
    pub(crate) fn rebuild_coverage(&mut self) -> Vec<CellPos> {
        let orphans = self.orphans();
        let (coverage, conflicts) = compute_coverage(&self.rows, &orphans);
        self.coverage = coverage;
        conflicts
    }

    /// Move orphaned placeholders after a structural change. Owner entries
    /// are dropped here and recomputed by `rebuild_coverage`.
    pub(crate) fn remap_orphans(&mut self, f: impl Fn(CellPos) -> Option<CellPos>) {
        let orphans: Vec<CellPos> = self.orphans().into_iter().filter_map(f).collect();
        self.coverage.clear();
        for pos in orphans {
            self.coverage.insert(pos, Coverage::Orphaned);
        }
    }

    /// Forget every merge and placeholder (repair).
    pub(crate) fn clear_coverage(&mut self) {
        self.coverage.clear();
    }

    /// Drop an orphaned placeholder marker so the slot renders again.
    pub(crate) fn revive_orphan(&mut self, pos: CellPos) {
        if self.coverage.get(&pos) == Some(&Coverage::Orphaned) {
            self.coverage.remove(&pos);
        }
    }

    /// Slots claimed by more than one span, without touching the document.
    pub fn overlapping_slots(&self) -> Vec<CellPos> {
        compute_coverage(&self.rows, &self.orphans()).1
    }
}

/// Derive coverage from spans in row-major order. A span only reaches
/// slots after its owner, so every covered slot is claimed before it is
/// visited.
fn compute_coverage(
    rows: &[Row],
    orphans: &FxHashSet<CellPos>,
) -> (FxHashMap<CellPos, Coverage>, Vec<CellPos>) {
    let mut coverage = FxHashMap::default();
    let mut conflicts = Vec::new();

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.cells.iter().enumerate() {
            let pos = CellPos::new(r, c);
            if coverage.contains_key(&pos) {
                continue;
            }
            if orphans.contains(&pos) {
                coverage.insert(pos, Coverage::Orphaned);
                continue;
            }
            if !cell.is_merged() {
                continue;
            }
            for covered in Range::from_span(pos, cell.rowspan, cell.colspan).cells() {
                if covered == pos {
                    continue;
                }
                let exists = rows
                    .get(covered.row)
                    .map(|row| covered.col < row.cells.len())
                    .unwrap_or(false);
                if !exists {
                    continue;
                }
                match coverage.get(&covered) {
                    Some(Coverage::Owner(_)) => conflicts.push(covered),
                    _ => {
                        coverage.insert(covered, Coverage::Owner(pos));
                    }
                }
            }
        }
    }

    (coverage, conflicts)
}

struct ParsedRow {
    cells: Vec<(Cell, bool)>,
    height: Option<String>,
}

fn parse_row(raw: &Value) -> ParsedRow {
    let (cells, height) = match raw {
        Value::Array(cells) => (cells.as_slice(), None),
        Value::Object(obj) => (
            obj.get("cells").and_then(Value::as_array).map(|c| c.as_slice()).unwrap_or(&[]),
            obj.get("height").filter(|h| !h.is_null()).map(width_spec),
        ),
        _ => (&[][..], None),
    };
    ParsedRow {
        cells: cells.iter().map(parse_cell).collect(),
        height,
    }
}

/// Fill every missing cell field with its default. Returns the cell and
/// whether it was flagged `_merged`.
fn parse_cell(raw: &Value) -> (Cell, bool) {
    let obj = match raw {
        Value::Object(obj) => obj,
        Value::String(s) => return (Cell::text(rich_text::escape_html(s)), false),
        Value::Number(n) => return (Cell::text(n.to_string()), false),
        _ => return (Cell::default(), false),
    };
    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);
    let color_field = |key: &str| {
        str_field(key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let content = match obj.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let image_data = obj.get("imageData").and_then(Value::as_object).and_then(|img| {
        let url = img.get("url").and_then(Value::as_str)?.to_string();
        let alt = img.get("alt").and_then(Value::as_str).unwrap_or("").to_string();
        Some(ImageData { url, alt })
    });

    let cell = Cell {
        content_type: str_field("contentType").and_then(ContentType::parse).unwrap_or_default(),
        content,
        image_data,
        colspan: span_field(obj.get("colspan"), MAX_COLSPAN),
        rowspan: span_field(obj.get("rowspan"), MAX_ROWSPAN),
        font_style: str_field("fontStyle").and_then(FontStyle::parse).unwrap_or_default(),
        alignment: str_field("alignment").and_then(Alignment::parse).unwrap_or_default(),
        vertical_alignment: str_field("verticalAlignment")
            .and_then(VerticalAlignment::parse)
            .unwrap_or_default(),
        borders: obj.get("borders").map(CellBorders::from_json).unwrap_or_default(),
        background_color: color_field("backgroundColor"),
        text_color: color_field("textColor"),
        hover_bg_color: color_field("hoverBgColor"),
        hover_text_color: color_field("hoverTextColor"),
        css_class: str_field("cssClass").unwrap_or("").to_string(),
    };
    let merged = obj.get("_merged").and_then(Value::as_bool).unwrap_or(false);
    (cell, merged)
}

/// Span limits browsers apply to `colspan` and `rowspan`.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

fn span_field(raw: Option<&Value>, limit: usize) -> usize {
    let span = match raw {
        Some(Value::Number(n)) => n.as_u64().map_or(1, |n| usize::try_from(n).unwrap_or(usize::MAX)),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    };
    span.clamp(1, limit)
}

fn width_spec(raw: &Value) -> String {
    match raw {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => format!("{n}px"),
        _ => "auto".to_string(),
    }
}

/// HTML table placement: each cell takes the next column not already
/// occupied by a rowspan from an earlier row. Covered slots and interior
/// gaps become default placeholder cells.
fn place_rows(parsed: Vec<ParsedRow>) -> Vec<Row> {
    let row_count = parsed.len();
    let mut grid: Vec<Vec<Option<Cell>>> = vec![Vec::new(); row_count];
    let mut occupied: FxHashSet<CellPos> = FxHashSet::default();
    let mut heights = Vec::with_capacity(row_count);

    for (r, row) in parsed.into_iter().enumerate() {
        heights.push(row.height);
        let mut col = 0;
        for (mut cell, _) in row.cells {
            while occupied.contains(&CellPos::new(r, col)) {
                col += 1;
            }
            cell.rowspan = cell.rowspan.min(row_count - r);
            let area = Range::from_span(CellPos::new(r, col), cell.rowspan, cell.colspan);
            for pos in area.cells() {
                occupied.insert(pos);
            }
            let slots = &mut grid[r];
            if slots.len() <= col {
                slots.resize(col + 1, None);
            }
            let width = cell.colspan;
            slots[col] = Some(cell);
            col += width;
        }
    }

    let mut widths = vec![0usize; row_count];
    for pos in &occupied {
        widths[pos.row] = widths[pos.row].max(pos.col + 1);
    }

    grid.into_iter()
        .zip(heights)
        .enumerate()
        .map(|(r, (mut slots, height))| {
            slots.resize(widths[r].max(slots.len()), None);
            Row {
                cells: slots.into_iter().map(Option::unwrap_or_default).collect(),
                height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_config_gives_default_table() {
        for raw in [json!(null), json!({}), json!({"rows": []}), json!("garbage")] {
            let doc = GridDocument::normalize(&raw);
            assert_eq!(doc.row_count(), 2);
            assert_eq!(doc.column_count(), 2);
            assert_eq!(doc.literal_len(0), 2);
        }
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{"content": "a"}, {}]}],
        }));
        let cell = doc.cell(CellPos::new(0, 0)).unwrap();
        assert_eq!(cell.content, "a");
        assert_eq!(cell.colspan, 1);
        assert_eq!(cell.rowspan, 1);
        assert!(doc.show_borders);
        assert_eq!(doc.table_width, "100%");
    }

    #[test]
    fn test_column_widths_derived_from_longest_row() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{}, {}]}, {"cells": [{}, {}, {}]}],
        }));
        assert_eq!(doc.column_widths, vec!["auto"; 3]);
    }

    #[test]
    fn test_numeric_column_width_becomes_px() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{}, {}]}],
            "columnWidths": [120, "25%"],
        }));
        assert_eq!(doc.column_widths, vec!["120px".to_string(), "25%".to_string()]);
    }

    #[test]
    fn test_zero_span_clamped() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{"colspan": 0, "rowspan": "0"}]}],
        }));
        let cell = doc.cell(CellPos::new(0, 0)).unwrap();
        assert_eq!((cell.colspan, cell.rowspan), (1, 1));
    }

    #[test]
    fn test_editor_form_resolves_placeholders() {
        let doc = GridDocument::normalize(&json!({
            "rows": [
                {"cells": [{"colspan": 2, "content": "ab"}, {"_merged": true}, {}]},
                {"cells": [{}, {}, {}]},
            ],
        }));
        assert_eq!(doc.coverage(CellPos::new(0, 1)), Some(Coverage::Owner(CellPos::new(0, 0))));
        assert_eq!(doc.owner_of(CellPos::new(0, 1)), Some(CellPos::new(0, 0)));
        assert_eq!(doc.visible_width(0), 3);
    }

    #[test]
    fn test_orphaned_placeholder_is_not_rendered() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{}, {"_merged": true}]}],
        }));
        assert_eq!(doc.coverage(CellPos::new(0, 1)), Some(Coverage::Orphaned));
        assert_eq!(doc.owner_of(CellPos::new(0, 1)), None);
        assert_eq!(doc.visible_width(0), 1);
    }

    #[test]
    fn test_export_form_is_laid_out_like_html() {
        // Row 1 has one literal cell; (1,0) is covered by the rowspan above.
        let doc = GridDocument::normalize(&json!({
            "rows": [
                {"cells": [{"rowspan": 2, "content": "tall"}, {"content": "b"}]},
                {"cells": [{"content": "d"}]},
            ],
        }));
        assert_eq!(doc.literal_len(1), 2);
        assert!(doc.is_covered(CellPos::new(1, 0)));
        assert_eq!(doc.cell(CellPos::new(1, 1)).unwrap().content, "d");
        assert_eq!(doc.visible_width(1), 2);
    }

    #[test]
    fn test_rowspan_past_last_row_clamped_in_export_form() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{"rowspan": 5}, {}]}],
        }));
        assert_eq!(doc.cell(CellPos::new(0, 0)).unwrap().rowspan, 1);
    }

    #[test]
    fn test_huge_spans_are_bounded() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{}, {"colspan": u64::MAX}, {"_merged": true}]}],
        }));
        assert_eq!(doc.cell(CellPos::new(0, 1)).unwrap().colspan, 2);
        assert_eq!(doc.owner_of(CellPos::new(0, 2)), Some(CellPos::new(0, 1)));
        assert!(doc.validate_table_structure().is_valid);

        let doc = GridDocument::normalize(&json!({
            "rows": [
                {"cells": [{"colspan": 1_000_000_000, "rowspan": "99999999999"}]},
                {"cells": [{}]},
            ],
        }));
        let cell = doc.cell(CellPos::new(0, 0)).unwrap();
        assert_eq!((cell.colspan, cell.rowspan), (MAX_COLSPAN, 2));
        assert_eq!(doc.literal_len(0), MAX_COLSPAN);
        assert_eq!(doc.placements().len(), 2);
    }

    #[test]
    fn test_export_drops_covered_slots() {
        let doc = GridDocument::normalize(&json!({
            "rows": [
                {"cells": [{"colspan": 2}, {"_merged": true}]},
                {"cells": [{}, {}]},
            ],
        }));
        let export = doc.to_export_form();
        assert_eq!(export.rows[0].cells.len(), 1);
        assert_eq!(export.rows[1].cells.len(), 2);
        let value = serde_json::to_value(&export).unwrap();
        assert!(!value.to_string().contains("_merged"));
    }

    #[test]
    fn test_export_is_idempotent() {
        let doc = GridDocument::normalize(&json!({
            "rows": [
                {"cells": [{"colspan": 2, "rowspan": 2, "content": "x"}, {"_merged": true}, {"content": "c"}]},
                {"cells": [{"_merged": true}, {"_merged": true}, {"content": "f"}]},
                {"cells": [{}, {}, {}]},
            ],
        }));
        let once = doc.to_export_form();
        let again = GridDocument::from_export(once.clone()).to_export_form();
        assert_eq!(once, again);
    }

    #[test]
    fn test_string_cells_are_escaped() {
        let doc = GridDocument::normalize(&json!({"rows": [["a<b", 3]]}));
        assert_eq!(doc.cell(CellPos::new(0, 0)).unwrap().content, "a&lt;b");
        assert_eq!(doc.cell(CellPos::new(0, 1)).unwrap().content, "3");
    }

    #[test]
    fn test_append_rows_keeps_existing_rows() {
        let mut doc = GridDocument::new(1, 2);
        doc.append_rows(GridDocument::new(2, 2));
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.column_count(), 2);
    }

    #[test]
    fn test_placements_skip_covered() {
        let doc = GridDocument::normalize(&json!({
            "rows": [{"cells": [{"colspan": 2}, {"_merged": true}, {}]}],
        }));
        let placements = doc.placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].colspan, 2);
        assert_eq!(placements[1].pos, CellPos::new(0, 2));
    }
}
