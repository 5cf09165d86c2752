// Integration tests for the `gtable` binary.
// Run with: cargo test -p gridtable-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn gtable() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gtable"));
    // Keep the user's config dir out of the way.
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env("XDG_CONFIG_HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    gtable().args(args).output().expect("run gtable")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

const RAGGED: &str = r#"{"rows":[{"cells":[{"content":"a"},{"content":"b"}]},{"cells":[{"content":"c"},{"content":"d"},{"content":"e"}]}],"columnWidths":["auto","auto"]}"#;

const PLAIN: &str = r#"{"rows":[{"cells":[{"content":"a"},{"content":"b"}]},{"cells":[{"content":"c"},{"content":"d"}]}],"columnWidths":["auto","auto"]}"#;

// ---------------------------------------------------------------------------
// validate / repair
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_document() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    fs::write(&doc, PLAIN).unwrap();

    let out = run(&["validate", doc.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("valid (2 rows x 2 columns)"));
}

#[test]
fn validate_reports_issues_with_exit_1() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    fs::write(&doc, RAGGED).unwrap();

    let out = run(&["validate", doc.to_str().unwrap(), "--json"]);
    assert_eq!(out.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["isValid"], false);
    assert!(!report["issues"].as_array().unwrap().is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("gtable repair"));
}

#[test]
fn repair_writes_square_grid() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let fixed = dir.path().join("fixed.json");
    fs::write(&doc, RAGGED).unwrap();

    let out = run(&["repair", doc.to_str().unwrap(), "-o", fixed.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json = read_json(&fixed);
    assert_eq!(json["columnWidths"].as_array().unwrap().len(), 3);
    for row in json["rows"].as_array().unwrap() {
        assert_eq!(row["cells"].as_array().unwrap().len(), 3);
    }
    assert_eq!(json["rows"][1]["cells"][2]["content"], "e");

    let out = run(&["validate", fixed.to_str().unwrap()]);
    assert!(out.status.success());
}

#[test]
fn missing_file_is_io_error() {
    let out = run(&["validate", "/nonexistent/table.json"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn invalid_json_is_exit_1() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    fs::write(&doc, "{not json").unwrap();
    let out = run(&["render", doc.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn bad_arguments_are_usage_errors() {
    let out = run(&["import", "x.csv", "--mode", "sideways"]);
    assert_eq!(out.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[test]
fn import_csv_to_stdout() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("prices.csv");
    fs::write(&csv, "Item;Price\nTea;3\nCake;4\n").unwrap();

    let out = run(&["import", csv.to_str().unwrap(), "--header-row"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);
    assert_eq!(json["rows"][0]["cells"][0]["content"], "<strong>Item</strong>");
    assert_eq!(json["rows"][2]["cells"][1]["content"], "4");
}

#[test]
fn import_append_into_document() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let csv = dir.path().join("more.csv");
    fs::write(&doc, PLAIN).unwrap();
    fs::write(&csv, "x,y\n").unwrap();

    let out = run(&[
        "import",
        csv.to_str().unwrap(),
        "--into",
        doc.to_str().unwrap(),
        "--mode",
        "append",
        "-o",
        doc.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json = read_json(&doc);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["cells"][0]["content"], "a");
    assert_eq!(rows[2]["cells"][1]["content"], "y");
}

#[test]
fn import_unsupported_type_is_usage_error() {
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("table.pdf");
    fs::write(&pdf, "%PDF").unwrap();
    let out = run(&["import", pdf.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("hint:"));
}

// ---------------------------------------------------------------------------
// exec / render / export
// ---------------------------------------------------------------------------

#[test]
fn exec_script_merges_and_formats() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let script = dir.path().join("steps.jsonl");
    let out_doc = dir.path().join("out.json");
    fs::write(&doc, PLAIN).unwrap();
    fs::write(
        &script,
        "# header row\n\
         {\"select\": [[0,0],[0,1]], \"command\": \"mergeCells\"}\n\
         {\"select\": [[1,0]], \"key\": \"ctrl+b\"}\n\
         {\"command\": \"setCaption\", \"value\": \"Menu\"}\n",
    )
    .unwrap();

    let out = run(&[
        "exec",
        doc.to_str().unwrap(),
        script.to_str().unwrap(),
        "-o",
        out_doc.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json = read_json(&out_doc);
    assert_eq!(json["caption"], "Menu");
    assert_eq!(json["rows"][0]["cells"].as_array().unwrap().len(), 1);
    assert_eq!(json["rows"][0]["cells"][0]["colspan"], 2);
    assert_eq!(json["rows"][0]["cells"][0]["content"], "a b");
    assert_eq!(json["rows"][1]["cells"][0]["content"], "<strong>c</strong>");
}

#[test]
fn exec_strict_fails_on_refused_step() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let script = dir.path().join("steps.jsonl");
    fs::write(&doc, PLAIN).unwrap();
    fs::write(&script, "{\"select\": [[0,0],[1,1]], \"command\": \"mergeCells\"}\n").unwrap();

    let out = run(&["exec", doc.to_str().unwrap(), script.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 1:"));

    let out = run(&["exec", doc.to_str().unwrap(), script.to_str().unwrap(), "--strict"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exec_bad_script_line() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let script = dir.path().join("steps.jsonl");
    fs::write(&doc, PLAIN).unwrap();
    fs::write(&script, "{\"command\": \"undo\"}\nnot json\n").unwrap();

    let out = run(&["exec", doc.to_str().unwrap(), script.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 2"));
}

#[test]
fn render_draws_grid() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    fs::write(&doc, PLAIN).unwrap();

    let out = run(&["render", doc.to_str().unwrap(), "--width", "4"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "+----+----+\n|a   |b   |\n+----+----+\n|c   |d   |\n+----+----+\n"
    );
}

#[test]
fn export_tsv() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("table.json");
    let tsv = dir.path().join("table.tsv");
    fs::write(&doc, PLAIN).unwrap();

    let out = run(&["export", doc.to_str().unwrap(), "-o", tsv.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&tsv).unwrap(), "a\tb\nc\td\n");

    let out = run(&["export", doc.to_str().unwrap(), "-o", "table.pdf"]);
    assert_eq!(out.status.code(), Some(2));
}
