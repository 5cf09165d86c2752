//! CLI Exit Code Registry
//!
//! Single source of truth for `gtable` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | Invalid document, or a script step the editor refused    |
//! | 2    | Usage error (bad arguments, unsupported file type)       |
//! | 3    | I/O error (unreadable input, unwritable output)          |

use gridtable_io::ImportError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// The document failed validation, could not be parsed, or (with
/// `--strict`) a script step was refused.
pub const EXIT_INVALID: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with the same code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Map an import/load failure to its exit code.
pub fn import_exit_code(err: &ImportError) -> u8 {
    match err {
        ImportError::Io { .. } => EXIT_IO,
        ImportError::Parse { .. } | ImportError::NoTable => EXIT_INVALID,
        ImportError::UnsupportedFormat(_) => EXIT_USAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_errors_map_to_codes() {
        assert_eq!(import_exit_code(&ImportError::NoTable), EXIT_INVALID);
        assert_eq!(import_exit_code(&ImportError::UnsupportedFormat("pdf".into())), EXIT_USAGE);
        assert_eq!(
            import_exit_code(&ImportError::Io { path: "x.csv".into(), message: "gone".into() }),
            EXIT_IO
        );
    }
}
