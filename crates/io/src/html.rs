// HTML table import (pasted web content, saved pages)

use std::sync::OnceLock;

use regex::Regex;

use gridtable_config::ImportProfile;
use gridtable_engine::rich_text::{decode_entities, RichText};
use gridtable_engine::{Cell, ContentType, ExportDocument, ImageData, Mark, Row};

use crate::error::ImportError;

struct Patterns {
    table: Regex,
    caption: Regex,
    row: Regex,
    cell: Regex,
    colspan: Regex,
    rowspan: Regex,
    img: Regex,
    alt: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid table regex");
        Patterns {
            table: re(r"(?is)<table\b[^>]*>(.*?)</table\s*>"),
            caption: re(r"(?is)<caption\b[^>]*>(.*?)</caption\s*>"),
            row: re(r"(?is)<tr\b[^>]*>(.*?)(?:</tr\s*>|$)"),
            cell: re(r"(?is)<t([dh])\b([^>]*)>(.*?)</t[dh]\s*>"),
            colspan: re(r#"(?i)\bcolspan\s*=\s*["']?(\d+)"#),
            rowspan: re(r#"(?i)\browspan\s*=\s*["']?(\d+)"#),
            img: re(r#"(?i)<img\b[^>]*\bsrc\s*=\s*["']([^"']*)["'][^>]*>"#),
            alt: re(r#"(?i)\balt\s*=\s*["']([^"']*)["']"#),
        }
    })
}

fn span_attr(re: &Regex, attrs: &str) -> usize {
    re.captures(attrs)
        .and_then(|c| c[1].parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// True when `content` holds something that looks like an HTML table.
pub fn looks_like_table(content: &str) -> bool {
    patterns().table.is_match(content)
}

/// Import the first `<table>` in `content` as an export-form document.
///
/// Spans are kept; cell markup is reduced to the inline formatting the
/// editor understands. A cell holding only an image becomes an image cell.
/// Column widths are left empty and derived when the document is normalized.
pub fn import_from_string(content: &str, profile: &ImportProfile) -> Result<ExportDocument, ImportError> {
    let p = patterns();
    let table = p.table.captures(content).ok_or(ImportError::NoTable)?;
    let body = &table[1];

    let caption = p
        .caption
        .captures(body)
        .map(|c| RichText::from_html(&c[1]).plain_text().trim().to_string())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for row in p.row.captures_iter(body) {
        let cells: Vec<Cell> = p
            .cell
            .captures_iter(&row[1])
            .map(|cap| {
                let header = cap[1].eq_ignore_ascii_case("h");
                let mut cell = import_cell(&cap[3], profile);
                cell.colspan = span_attr(&p.colspan, &cap[2]);
                cell.rowspan = span_attr(&p.rowspan, &cap[2]);
                if header && !cell.content.is_empty() && !cell.is_image() {
                    let mut rich = RichText::from_html(&cell.content);
                    rich.set_mark(Mark::Bold, true);
                    cell.content = rich.to_html();
                }
                cell
            })
            .collect();
        if !cells.is_empty() {
            rows.push(Row { cells, height: None });
        }
        if profile.row_limit().is_some_and(|limit| rows.len() >= limit) {
            break;
        }
    }

    if rows.is_empty() {
        return Err(ImportError::NoTable);
    }
    log::debug!("imported HTML table with {} rows", rows.len());

    Ok(ExportDocument {
        rows,
        column_widths: Vec::new(),
        caption,
        show_borders: true,
        striped_rows: false,
        hover_effect: false,
        responsive: true,
        table_width: "100%".to_string(),
    })
}

fn import_cell(inner: &str, profile: &ImportProfile) -> Cell {
    let p = patterns();
    let rich = RichText::from_html(inner);
    let text = rich.plain_text();

    if text.trim().is_empty() {
        if let Some(img) = p.img.captures(inner) {
            let alt = p
                .alt
                .captures(&img[0])
                .map(|c| decode_entities(&c[1]))
                .unwrap_or_default();
            return Cell {
                content_type: ContentType::Image,
                image_data: Some(ImageData { url: decode_entities(&img[1]), alt }),
                ..Cell::default()
            };
        }
    }

    let rich = if profile.trim && text.trim() != text {
        trim_rich(rich)
    } else {
        rich
    };
    Cell::text(rich.to_html())
}

/// Strip leading and trailing whitespace while keeping run formatting.
fn trim_rich(rich: RichText) -> RichText {
    let mut runs: Vec<_> = rich.runs().to_vec();
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    let mut out = RichText::new();
    for run in runs.into_iter().filter(|r| !r.text.is_empty()) {
        out.push(&run.text, run.marks);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtable_engine::{CellPos, GridDocument};

    #[test]
    fn test_first_table_with_spans() {
        let html = r#"
            <p>intro</p>
            <table class="x"><caption>Q1 <b>sales</b></caption>
              <tr><th colspan="2">Region</th><td rowspan=2>Total</td></tr>
              <tr><td>North</td><td>South</td></tr>
            </table>
            <table><tr><td>ignored</td></tr></table>"#;
        let export = import_from_string(html, &ImportProfile::default()).unwrap();
        assert_eq!(export.caption, "Q1 sales");
        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].cells[0].colspan, 2);
        assert_eq!(export.rows[0].cells[0].content, "<strong>Region</strong>");
        assert_eq!(export.rows[0].cells[1].rowspan, 2);

        let doc = GridDocument::from_export(export);
        assert_eq!(doc.column_count(), 3);
        assert!(doc.is_covered(CellPos::new(1, 2)));
        assert!(doc.validate_table_structure().is_valid);
    }

    #[test]
    fn test_markup_is_sanitized() {
        let html = "<table><tr><td><span style=\"x\">a <em>b</em></span><script>x</script></td></tr></table>";
        let export = import_from_string(html, &ImportProfile::default()).unwrap();
        let content = &export.rows[0].cells[0].content;
        assert!(content.contains("<em>b</em>"));
        assert!(!content.contains("span"));
    }

    #[test]
    fn test_image_cell() {
        let html = r#"<table><tr><td><img src="/a.png" alt="Logo &amp; mark"></td></tr></table>"#;
        let export = import_from_string(html, &ImportProfile::default()).unwrap();
        let cell = &export.rows[0].cells[0];
        assert!(cell.is_image());
        let img = cell.image_data.as_ref().unwrap();
        assert_eq!(img.url, "/a.png");
        assert_eq!(img.alt, "Logo & mark");
    }

    #[test]
    fn test_no_table() {
        assert!(!looks_like_table("<p>nothing</p>"));
        assert_eq!(
            import_from_string("<p>nothing</p>", &ImportProfile::default()),
            Err(ImportError::NoTable)
        );
        assert_eq!(
            import_from_string("<table></table>", &ImportProfile::default()),
            Err(ImportError::NoTable)
        );
    }
}
