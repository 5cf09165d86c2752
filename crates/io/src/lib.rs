//! Import collaborator and document files.
//!
//! Every importer produces an export-form document; nothing here touches
//! the document being edited. Callers hand the result to
//! `GridDocument::apply_import`.

pub mod csv;
pub mod error;
pub mod html;
pub mod json;
pub mod spreadsheet;
pub mod tabular;

use std::path::Path;

use gridtable_config::ImportProfile;
use gridtable_engine::GridDocument;

pub use error::ImportError;
pub use json::{load_document, save_document};

/// Import a file, choosing the reader by extension.
pub fn import_file(path: &Path, profile: &ImportProfile) -> Result<GridDocument, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let export = match ext.as_str() {
        "csv" | "txt" => csv::import(path, profile)?,
        "tsv" | "tab" => csv::import_tsv(path, profile)?,
        "html" | "htm" => {
            let content = csv::read_file_as_utf8(path)?;
            html::import_from_string(&content, profile)?
        }
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => spreadsheet::import(path, profile)?,
        "json" => return load_document(path),
        other => return Err(ImportError::UnsupportedFormat(other.to_string())),
    };
    log::info!("imported {} ({} rows)", path.display(), export.rows.len());
    Ok(GridDocument::from_export(export))
}

/// Import pasted text: an HTML table when one is present, else delimited text.
pub fn import_text(content: &str, profile: &ImportProfile) -> Result<GridDocument, ImportError> {
    let export = if html::looks_like_table(content) {
        html::import_from_string(content, profile)?
    } else {
        csv::import_from_string(content, profile)?
    };
    Ok(GridDocument::from_export(export))
}
