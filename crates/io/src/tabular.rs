// Plain value grids -> export-form documents

use gridtable_config::ImportProfile;
use gridtable_engine::rich_text::escape_html;
use gridtable_engine::{Cell, ExportDocument, Row};

use crate::error::ImportError;

/// Turn rows of plain values into a rectangular export-form document.
/// Short rows are padded with empty cells; values are HTML-escaped.
pub fn values_to_document(
    values: Vec<Vec<String>>,
    profile: &ImportProfile,
) -> Result<ExportDocument, ImportError> {
    let mut values = values;
    if let Some(limit) = profile.row_limit() {
        values.truncate(limit);
    }
    // Trailing blank lines are noise from the source file
    while values.last().is_some_and(|row| row.iter().all(|v| v.trim().is_empty())) {
        values.pop();
    }
    let width = values.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Err(ImportError::NoTable);
    }

    let rows = values
        .into_iter()
        .enumerate()
        .map(|(r, row)| {
            let mut cells: Vec<Cell> = row
                .iter()
                .map(|value| {
                    let value = if profile.trim { value.trim() } else { value.as_str() };
                    let mut content = escape_html(value);
                    if r == 0 && profile.header_row && !content.is_empty() {
                        content = format!("<strong>{content}</strong>");
                    }
                    Cell::text(content)
                })
                .collect();
            cells.resize_with(width, Cell::default);
            Row { cells, height: None }
        })
        .collect();

    Ok(ExportDocument {
        rows,
        column_widths: vec!["auto".to_string(); width],
        caption: String::new(),
        show_borders: true,
        striped_rows: false,
        hover_effect: false,
        responsive: true,
        table_width: "100%".to_string(),
    })
}
