// Random command sequences never leave the table malformed.

use proptest::prelude::*;
use serde_json::{json, Value};

use gridtable_core::CellPos;
use gridtable_editor::{TableEditor, TextSurface};

#[derive(Debug, Clone)]
enum Step {
    Select(usize, usize, usize, usize),
    Command(&'static str, Value),
}

fn step() -> impl Strategy<Value = Step> {
    let select = (0..5usize, 0..5usize, 0..3usize, 0..3usize)
        .prop_map(|(r, c, h, w)| Step::Select(r, c, h, w));
    let command = prop_oneof![
        Just(Step::Command("mergeCells", Value::Null)),
        Just(Step::Command("splitCell", Value::Null)),
        Just(Step::Command("growCell", Value::Null)),
        Just(Step::Command("shrinkCell", Value::Null)),
        Just(Step::Command("addRow", json!("end"))),
        Just(Step::Command("addRow", json!("start"))),
        Just(Step::Command("removeRow", Value::Null)),
        Just(Step::Command("addColumn", json!("end"))),
        Just(Step::Command("removeColumn", Value::Null)),
        Just(Step::Command("copy", Value::Null)),
        Just(Step::Command("cut", Value::Null)),
        Just(Step::Command("paste", Value::Null)),
        Just(Step::Command("bold", Value::Null)),
        Just(Step::Command("setBorders", json!({"top": true, "left": true}))),
        Just(Step::Command("undo", Value::Null)),
        Just(Step::Command("redo", Value::Null)),
    ];
    prop_oneof![select, command]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn commands_keep_structure_valid(steps in prop::collection::vec(step(), 1..40)) {
        let mut editor = TableEditor::new(
            &json!({"rows": [
                {"cells": [{"content": "a"}, {"content": "b"}, {"content": "c"}]},
                {"cells": [{"content": "d"}, {"content": "e"}, {"content": "f"}]},
                {"cells": [{"content": "g"}, {"content": "h"}, {"content": "i"}]},
            ]}),
            TextSurface::new(4),
        );

        for step in steps {
            match step {
                Step::Select(r, c, h, w) => {
                    let cells: Vec<CellPos> = (r..=r + h)
                        .flat_map(|row| (c..=c + w).map(move |col| CellPos::new(row, col)))
                        .filter(|pos| editor.document().contains(*pos))
                        .collect();
                    editor.select(&cells);
                }
                Step::Command(name, value) => editor.handle_command(name, &value),
            }

            let report = editor.document().validate_table_structure();
            prop_assert!(report.is_valid, "{:?}", report.issues);
            prop_assert!(editor.document().row_count() >= 1);
            prop_assert!(editor.document().column_count() >= 1);
            for pos in editor.selection() {
                prop_assert!(editor.document().cell(*pos).is_some(), "stale selection {}", pos);
            }
        }
    }

    #[test]
    fn undo_everything_restores_the_start(steps in prop::collection::vec(step(), 1..25)) {
        let mut editor = TableEditor::new(&Value::Null, TextSurface::default());
        let start = editor.document().clone();
        for step in steps {
            match step {
                Step::Select(r, c, h, w) => {
                    let cells: Vec<CellPos> = (r..=r + h)
                        .flat_map(|row| (c..=c + w).map(move |col| CellPos::new(row, col)))
                        .filter(|pos| editor.document().contains(*pos))
                        .collect();
                    editor.select(&cells);
                }
                Step::Command("undo" | "redo", _) => {}
                Step::Command(name, value) => editor.handle_command(name, &value),
            }
        }
        while editor.history().can_undo() {
            editor.undo();
        }
        prop_assert_eq!(editor.document(), &start);
    }
}
