use std::fmt;
use std::path::PathBuf;

/// Why an import or load produced no document. The current document is
/// never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    Io { path: PathBuf, message: String },
    Parse { format: &'static str, message: String },
    /// The input parsed but held no table rows.
    NoTable,
    UnsupportedFormat(String),
}

impl ImportError {
    pub(crate) fn io(path: &std::path::Path, err: impl fmt::Display) -> Self {
        Self::Io { path: path.to_path_buf(), message: err.to_string() }
    }

    pub(crate) fn parse(format: &'static str, err: impl fmt::Display) -> Self {
        Self::Parse { format, message: err.to_string() }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "Cannot read {}: {message}", path.display()),
            Self::Parse { format, message } => write!(f, "Invalid {format}: {message}"),
            Self::NoTable => write!(f, "No table data found"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file type: {ext}"),
        }
    }
}

impl std::error::Error for ImportError {}
