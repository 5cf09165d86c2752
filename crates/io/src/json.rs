// JSON document load/save

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use gridtable_engine::GridDocument;

use crate::error::ImportError;

/// Load a table document. Legacy and export-form config both normalize;
/// only unreadable files and invalid JSON are errors.
pub fn load_document(path: &Path) -> Result<GridDocument, ImportError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| ImportError::parse("JSON", e))?;
    Ok(GridDocument::normalize(&value))
}

/// Write the export form (covered slots dropped) as pretty JSON.
pub fn save_document(doc: &GridDocument, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &doc.to_export_form()).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn to_json_string(doc: &GridDocument) -> Result<String, String> {
    serde_json::to_string_pretty(&doc.to_export_form()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtable_engine::CellPos;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.json");

        let mut doc = GridDocument::new(3, 3);
        doc.cell_mut(CellPos::new(0, 0)).unwrap().content = "<strong>A</strong>".into();
        doc.merge_cells(&[
            CellPos::new(1, 0),
            CellPos::new(1, 1),
            CellPos::new(2, 0),
            CellPos::new(2, 1),
        ])
        .unwrap();

        save_document(&doc, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"columnWidths\""));
        assert!(!text.contains("_merged"));

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ rows: ").unwrap();
        assert!(matches!(load_document(&path), Err(ImportError::Parse { format: "JSON", .. })));
    }

    #[test]
    fn test_shapeless_json_loads_default_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(load_document(&path).unwrap(), GridDocument::default_table());
    }
}
