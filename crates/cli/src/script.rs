//! Command scripts for `gtable exec`.
//!
//! One JSON object per line. A step may select cells, press a key, edit a
//! cell, and run a command, in that order:
//!
//! ```text
//! {"select": [[0,0],[0,1]], "command": "mergeCells"}
//! {"select": [[1,0]], "key": "ctrl+b"}
//! {"edit": [1,1], "html": "Visit site"}
//! {"command": "setBorders", "value": {"top": true}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use gridtable_editor::{EditorEvent, EventCollector, Surface, TableEditor};
use gridtable_engine::CellPos;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Step {
    pub select: Option<Vec<(usize, usize)>>,
    pub key: Option<String>,
    /// Enter edit mode on this cell and commit `html` into it.
    pub edit: Option<(usize, usize)>,
    pub html: Option<String>,
    pub command: Option<String>,
    pub value: Value,
}

/// A step the editor refused, with its 1-based script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScriptOutcome {
    pub steps: usize,
    pub refusals: Vec<Refusal>,
}

pub fn parse_script(script: &str) -> Result<Vec<(usize, Step)>, String> {
    script
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            let step: Step = serde_json::from_str(line).map_err(|e| format!("line {line_no}: {e}"))?;
            if step.html.is_some() && step.edit.is_none() {
                return Err(format!("line {line_no}: \"html\" needs \"edit\""));
            }
            Ok((line_no, step))
        })
        .collect()
}

/// Run parsed steps against the editor, collecting the status messages
/// each step produced.
pub fn run<S: Surface>(editor: &mut TableEditor<S>, steps: Vec<(usize, Step)>) -> ScriptOutcome {
    let collector = Rc::new(RefCell::new(EventCollector::new()));
    let sink = Rc::clone(&collector);
    editor.subscribe(move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });

    let mut outcome = ScriptOutcome::default();
    for (line, step) in steps {
        if let Some(cells) = &step.select {
            let cells: Vec<CellPos> = cells.iter().map(|&(r, c)| CellPos::new(r, c)).collect();
            editor.select(&cells);
        }
        if let Some(key) = &step.key {
            if !editor.handle_key(key) {
                log::warn!("line {line}: key '{key}' is not bound");
            }
        }
        if let Some((row, col)) = step.edit {
            if editor.enter_edit(CellPos::new(row, col)) {
                if let Some(html) = &step.html {
                    editor.commit_edit(html);
                }
            } else {
                let message = format!("No cell at row {row}, column {col}");
                collector.borrow_mut().push(EditorEvent::Status(message));
            }
        }
        if let Some(command) = &step.command {
            editor.handle_command(command, &step.value);
        }

        let mut events = collector.borrow_mut();
        outcome
            .refusals
            .extend(events.statuses().into_iter().map(|message| Refusal { line, message: message.to_string() }));
        events.clear();
        outcome.steps += 1;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtable_editor::TextSurface;
    use gridtable_engine::GridDocument;

    fn editor(rows: usize, cols: usize) -> TableEditor<TextSurface> {
        TableEditor::with_config(
            GridDocument::new(rows, cols),
            TextSurface::default(),
            Default::default(),
            Default::default(),
        )
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let steps = parse_script("# merge the header\n\n{\"select\": [[0,0],[0,1]], \"command\": \"mergeCells\"}\n")
            .unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].0, 3);
        assert_eq!(steps[0].1.select, Some(vec![(0, 0), (0, 1)]));
        assert_eq!(steps[0].1.value, Value::Null);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = parse_script("{\"command\": \"undo\"}\n{\"comand\": \"redo\"}").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
        let err = parse_script("{\"html\": \"x\"}").unwrap_err();
        assert!(err.contains("needs \"edit\""));
    }

    #[test]
    fn test_run_collects_refusals() {
        let mut ed = editor(1, 2);
        let steps = parse_script(
            "{\"command\": \"removeRow\", \"value\": 0}\n\
             {\"select\": [[0,0],[0,1]], \"command\": \"mergeCells\"}\n\
             {\"edit\": [0,0], \"html\": \"<b>Total</b>\"}",
        )
        .unwrap();
        let outcome = run(&mut ed, steps);

        assert_eq!(outcome.steps, 3);
        assert_eq!(
            outcome.refusals,
            vec![Refusal { line: 1, message: "Cannot remove the last row".into() }]
        );
        assert_eq!(ed.document().cell(CellPos::new(0, 0)).unwrap().colspan, 2);
        assert_eq!(ed.document().plain_text(CellPos::new(0, 0)), "Total");
    }

    #[test]
    fn test_run_edit_outside_table_is_refused() {
        let mut ed = editor(1, 1);
        let outcome = run(&mut ed, parse_script("{\"edit\": [4,4], \"html\": \"x\"}").unwrap());
        assert_eq!(outcome.refusals.len(), 1);
        assert_eq!(outcome.refusals[0].line, 1);
    }
}
