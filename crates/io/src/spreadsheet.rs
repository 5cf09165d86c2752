// Spreadsheet import (xlsx, xls, xlsb, ods) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use gridtable_config::ImportProfile;
use gridtable_engine::ExportDocument;

use crate::error::ImportError;
use crate::tabular::values_to_document;

/// Tables larger than this are truncated; the editor is not a spreadsheet.
const MAX_ROWS: usize = 1000;
const MAX_COLS: usize = 64;

/// Import one sheet (the profile's `sheet`, else the first) as a table of values.
///
/// Only cell values are read. Merged regions and formatting are not carried over.
pub fn import(path: &Path, profile: &ImportProfile) -> Result<ExportDocument, ImportError> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| ImportError::parse("spreadsheet", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = if profile.sheet.is_empty() {
        sheet_names.first().cloned().ok_or(ImportError::NoTable)?
    } else if sheet_names.iter().any(|name| *name == profile.sheet) {
        profile.sheet.clone()
    } else {
        return Err(ImportError::parse(
            "spreadsheet",
            format!("no sheet named '{}'", profile.sheet),
        ));
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::parse("spreadsheet", format!("sheet '{sheet_name}': {e}")))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Err(ImportError::NoTable);
    }
    if height > MAX_ROWS || width > MAX_COLS {
        log::warn!(
            "sheet '{sheet_name}' truncated from {height}x{width} to {}x{}",
            height.min(MAX_ROWS),
            width.min(MAX_COLS)
        );
    }

    let values: Vec<Vec<String>> = range
        .rows()
        .take(MAX_ROWS)
        .map(|row| row.iter().take(MAX_COLS).map(format_value).collect())
        .collect();

    log::debug!("imported sheet '{sheet_name}' ({} rows)", values.len());
    values_to_document(values, profile)
}

/// Display text for a spreadsheet value.
pub(crate) fn format_value(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        // Date serials are kept as numbers; the table has no number formats
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
    }
}
