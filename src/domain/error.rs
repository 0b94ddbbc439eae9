use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    ParseError(String),
    DecodeError(String),
    ArchiveError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            AppError::ArchiveError(msg) => write!(f, "Archive error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => AppError::IoError(io.to_string()),
            other => AppError::ArchiveError(other.to_string()),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single diagnostic step, classified the way the report needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DiagnosticError {
    /// Working directory or its listing could not be read. Non-fatal.
    Environment(String),
    /// The archive is not at the expected path.
    ArchiveMissing(String),
    /// The archive size could not be read. Non-fatal.
    SizeProbe(String),
    /// The file exists but is not a readable ZIP archive.
    InvalidArchive(String),
    /// Anything else that went wrong while opening the archive.
    ArchiveOpen { message: String, trace: String },
    /// The archive has no `.csv` entry.
    NoCsvEntry,
    /// The CSV entry could not be opened for reading.
    CsvRead { message: String, trace: String },
    /// Every encoding candidate failed on the entry.
    Undecodable(String),
}

impl DiagnosticError {
    /// Whether this failure stops the remaining steps.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DiagnosticError::Environment(_) | DiagnosticError::SizeProbe(_)
        )
    }

    /// Build the error chain of `err` the way a traceback lists causes.
    pub fn trace_of(err: &(dyn std::error::Error + 'static)) -> String {
        let mut lines = vec![format!("{}", err)];
        let mut source = err.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        lines.join("\n")
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticError::Environment(msg) => write!(f, "Environment error: {}", msg),
            DiagnosticError::ArchiveMissing(path) => write!(f, "File not found: {}", path),
            DiagnosticError::SizeProbe(msg) => write!(f, "Could not read file size: {}", msg),
            DiagnosticError::InvalidArchive(msg) => {
                write!(f, "The file is not a valid ZIP or is corrupt: {}", msg)
            }
            DiagnosticError::ArchiveOpen { message, .. } => {
                write!(f, "Error opening ZIP: {}", message)
            }
            DiagnosticError::NoCsvEntry => write!(f, "No CSV files found inside the ZIP"),
            DiagnosticError::CsvRead { message, .. } => write!(f, "Error reading CSV: {}", message),
            DiagnosticError::Undecodable(entry) => {
                write!(f, "Could not read {} with any encoding", entry)
            }
        }
    }
}

impl std::error::Error for DiagnosticError {}
