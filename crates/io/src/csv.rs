// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use gridtable_config::ImportProfile;
use gridtable_engine::{CellPos, ExportDocument, GridDocument};

use crate::error::ImportError;
use crate::tabular::values_to_document;

/// Import a delimited file, sniffing the delimiter unless the profile names one.
pub fn import(path: &Path, profile: &ImportProfile) -> Result<ExportDocument, ImportError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, profile)
}

pub fn import_tsv(path: &Path, profile: &ImportProfile) -> Result<ExportDocument, ImportError> {
    let content = read_file_as_utf8(path)?;
    import_with_delimiter(&content, b'\t', profile)
}

/// Import pasted delimited text.
pub fn import_from_string(content: &str, profile: &ImportProfile) -> Result<ExportDocument, ImportError> {
    let delimiter = profile.delimiter_byte().unwrap_or_else(|| sniff_delimiter(content));
    import_with_delimiter(content, delimiter, profile)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Consistent lines times field count; wider wins ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let mut file = std::fs::File::open(path).map_err(|e| ImportError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| ImportError::io(path, e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{} is not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

fn import_with_delimiter(
    content: &str,
    delimiter: u8,
    profile: &ImportProfile,
) -> Result<ExportDocument, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut values = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::parse("CSV", e))?;
        values.push(record.iter().map(str::to_string).collect());
        if profile.row_limit().is_some_and(|limit| values.len() >= limit) {
            break;
        }
    }
    values_to_document(values, profile)
}

pub fn export(doc: &GridDocument, path: &Path) -> Result<(), String> {
    export_with_delimiter(doc, path, b',')
}

pub fn export_tsv(doc: &GridDocument, path: &Path) -> Result<(), String> {
    export_with_delimiter(doc, path, b'\t')
}

/// Write the plain text of every slot. Slots covered by a merge are written
/// empty so stale placeholder text never leaks.
fn export_with_delimiter(doc: &GridDocument, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for row in 0..doc.row_count() {
        let record: Vec<String> = (0..doc.column_count())
            .map(|col| {
                let pos = CellPos::new(row, col);
                match doc.cell(pos) {
                    Some(cell) if cell.is_image() => {
                        cell.image_data.as_ref().map(|img| img.url.clone()).unwrap_or_default()
                    }
                    Some(_) => doc.plain_text(pos),
                    None => String::new(),
                }
            })
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
