// gtable - headless table document operations

mod exit_codes;
mod script;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::{Logger, LoggerHandle};

use gridtable_config::{EditorSettings, ImportProfile, Keybindings};
use gridtable_editor::{render_list, Surface, TableEditor, TextSurface};
use gridtable_engine::{GridDocument, ImportMode};
use gridtable_io::ImportError;

use exit_codes::{import_exit_code, EXIT_INVALID, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gtable")]
#[command(about = "Validate, repair, import and edit table documents")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG applies when absent.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document's structure (row widths, column widths, orphans)
    #[command(after_help = "\
Examples:
  gtable validate table.json
  gtable validate table.json --json")]
    Validate {
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a malformed document as a plain grid (all merges cleared)
    Repair {
        file: PathBuf,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Import CSV/TSV, HTML or spreadsheet data as a table document
    #[command(after_help = "\
Examples:
  gtable import prices.csv -o table.json
  gtable import sheet.xlsx --sheet Q3 --header-row
  gtable import more.csv --into table.json --mode append -o table.json")]
    Import {
        file: PathBuf,

        /// Existing document to import into
        #[arg(long)]
        into: Option<PathBuf>,

        /// Replace the target document or append rows to it
        #[arg(long, value_enum, default_value = "replace", requires = "into")]
        mode: Mode,

        /// Import profile (TOML); defaults to the user profile
        #[arg(long, env = "GTABLE_IMPORT_PROFILE")]
        profile: Option<PathBuf>,

        /// Delimiter for delimited text ("auto" to sniff)
        #[arg(long)]
        delimiter: Option<String>,

        /// Render the first row bold
        #[arg(long)]
        header_row: bool,

        /// Spreadsheet sheet name
        #[arg(long)]
        sheet: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run a JSONL command script against a document
    #[command(after_help = "\
Each line is one step:
  {\"select\": [[0,0],[0,1]], \"command\": \"mergeCells\"}
  {\"select\": [[1,0]], \"key\": \"ctrl+b\"}
  {\"edit\": [1,1], \"html\": \"Visit <a href=\\\"/x\\\">site</a>\"}")]
    Exec {
        file: PathBuf,

        script: PathBuf,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 1 if any step was refused
        #[arg(long)]
        strict: bool,
    },

    /// Draw a document as a text grid
    Render {
        file: PathBuf,

        /// Characters per grid column
        #[arg(long, default_value_t = 12)]
        width: usize,
    },

    /// Write a document's cell text as CSV or TSV
    Export {
        file: PathBuf,

        /// Output file; .tsv/.tab writes tab-separated
        #[arg(long, short = 'o')]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Replace,
    Append,
}

impl From<Mode> for ImportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Replace => ImportMode::Replace,
            Mode::Append => ImportMode::Append,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ImportError> for CliError {
    fn from(err: ImportError) -> Self {
        let code = import_exit_code(&err);
        let hint = match &err {
            ImportError::UnsupportedFormat(_) => {
                Some("supported: csv, tsv, txt, html, xlsx, xls, ods, json".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn init_logging(verbose: u8) -> Option<LoggerHandle> {
    let builder = match verbose {
        0 => Logger::try_with_env_or_str("warn"),
        1 => Logger::try_with_str("info"),
        _ => Logger::try_with_str("debug"),
    };
    match builder.and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate { file, json } => cmd_validate(&file, json),
        Commands::Repair { file, output } => cmd_repair(&file, output.as_deref()),
        Commands::Import { file, into, mode, profile, delimiter, header_row, sheet, output } => {
            let profile = load_profile(profile.as_deref(), delimiter, header_row, sheet);
            cmd_import(&file, into.as_deref(), mode.into(), &profile, output.as_deref())
        }
        Commands::Exec { file, script, output, strict } => {
            cmd_exec(&file, &script, output.as_deref(), strict)
        }
        Commands::Render { file, width } => cmd_render(&file, width),
        Commands::Export { file, output } => cmd_export(&file, &output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_validate(file: &Path, json: bool) -> Result<(), CliError> {
    let doc = gridtable_io::load_document(file)?;
    let report = doc.validate_table_structure();

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| CliError::io(e.to_string()))?;
        println!("{out}");
    } else if report.is_valid {
        println!(
            "{}: valid ({} rows x {} columns)",
            file.display(),
            doc.row_count(),
            report.expected_columns
        );
    } else {
        for issue in &report.issues {
            println!("{}: {issue}", file.display());
        }
    }

    if report.is_valid {
        Ok(())
    } else {
        Err(CliError::invalid(format!("{} issue(s) found", report.issues.len()))
            .with_hint(format!("gtable repair {}", file.display())))
    }
}

fn cmd_repair(file: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let mut doc = gridtable_io::load_document(file)?;
    let before = doc.validate_table_structure();
    if before.is_valid {
        log::info!("{} is already valid; writing it unchanged", file.display());
    }
    let after = if before.is_valid { before } else { doc.fix_table_structure() };
    write_document(&doc, output)?;
    if after.is_valid {
        Ok(())
    } else {
        Err(CliError::invalid(after.issues.join("; ")))
    }
}

fn cmd_import(
    file: &Path,
    into: Option<&Path>,
    mode: ImportMode,
    profile: &ImportProfile,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let imported = gridtable_io::import_file(file, profile)?;
    let doc = match into {
        Some(target) => {
            let mut doc = gridtable_io::load_document(target)?;
            doc.apply_import(imported, mode);
            doc
        }
        None => imported,
    };
    write_document(&doc, output)
}

fn cmd_exec(file: &Path, script_path: &Path, output: Option<&Path>, strict: bool) -> Result<(), CliError> {
    let doc = gridtable_io::load_document(file)?;
    let text = fs::read_to_string(script_path)
        .map_err(|e| CliError::io(format!("Cannot read {}: {e}", script_path.display())))?;
    let steps = script::parse_script(&text).map_err(CliError::invalid)?;

    let mut editor = TableEditor::with_config(
        doc,
        TextSurface::default(),
        EditorSettings::load(),
        Keybindings::load(),
    );
    let outcome = script::run(&mut editor, steps);
    for refusal in &outcome.refusals {
        eprintln!("line {}: {}", refusal.line, refusal.message);
    }
    log::info!("{} steps, {} refused", outcome.steps, outcome.refusals.len());

    write_document(editor.document(), output)?;
    if strict && !outcome.refusals.is_empty() {
        return Err(CliError::invalid(format!("{} step(s) refused", outcome.refusals.len())));
    }
    Ok(())
}

fn cmd_render(file: &Path, width: usize) -> Result<(), CliError> {
    let doc = gridtable_io::load_document(file)?;
    let mut surface = TextSurface::new(width);
    surface.render(&render_list(&doc, &[], None, &[]));
    if !doc.caption.is_empty() {
        println!("{}", doc.caption);
    }
    print!("{}", surface.to_text());
    Ok(())
}

fn cmd_export(file: &Path, output: &Path) -> Result<(), CliError> {
    let doc = gridtable_io::load_document(file)?;
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let result = match ext.as_str() {
        "tsv" | "tab" => gridtable_io::csv::export_tsv(&doc, output),
        "csv" | "txt" => gridtable_io::csv::export(&doc, output),
        other => {
            return Err(CliError::usage(format!("Cannot export to '.{other}'")).with_hint("use a .csv or .tsv output"))
        }
    };
    result.map_err(|e| CliError::io(format!("Cannot write {}: {e}", output.display())))
}

// =============================================================================
// Helpers
// =============================================================================

fn load_profile(
    path: Option<&Path>,
    delimiter: Option<String>,
    header_row: bool,
    sheet: Option<String>,
) -> ImportProfile {
    let mut profile = match path {
        Some(path) => ImportProfile::load_from(path),
        None => ImportProfile::load(),
    };
    if let Some(delimiter) = delimiter {
        profile.delimiter = delimiter;
    }
    if header_row {
        profile.header_row = true;
    }
    if let Some(sheet) = sheet {
        profile.sheet = sheet;
    }
    profile
}

fn write_document(doc: &GridDocument, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => gridtable_io::save_document(doc, path)
            .map_err(|e| CliError::io(format!("Cannot write {}: {e}", path.display()))),
        None => {
            let json = gridtable_io::json::to_json_string(doc).map_err(CliError::io)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|e| CliError::io(e.to_string()))
        }
    }
}
