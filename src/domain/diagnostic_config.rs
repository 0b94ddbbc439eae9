//! Diagnostic configuration
//! Where the archive is expected and how the report is presented

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Archive the diagnostic looks for, relative to the working directory
pub const DEFAULT_ARCHIVE_PATH: &str = "delitos_con_poblacion_limpio.zip";

/// Rows decoded for the preview
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// How the finished report is written out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Settings for one diagnostic run
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Path of the zipped dataset
    #[validate(length(min = 1))]
    pub archive_path: String,

    /// Maximum data rows decoded for the preview
    #[validate(range(min = 1, max = 1000))]
    pub preview_rows: usize,

    /// Report title
    #[validate(length(min = 1))]
    pub title: String,

    /// Caption closing the report
    pub footer: String,

    /// Repository the remediation block points at, if any
    #[validate(url)]
    pub repository_url: Option<String>,

    pub output: OutputFormat,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            archive_path: DEFAULT_ARCHIVE_PATH.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            title: "Data Load Diagnostic".to_string(),
            footer: "Diagnostic finished".to_string(),
            repository_url: None,
            output: OutputFormat::Text,
        }
    }
}

impl DiagnosticConfig {
    /// File name of the archive, used in messages
    pub fn archive_name(&self) -> &str {
        std::path::Path::new(&self.archive_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DiagnosticConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.archive_path, DEFAULT_ARCHIVE_PATH);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn test_rejects_zero_preview_rows() {
        let config = DiagnosticConfig {
            preview_rows: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_repository_url() {
        let config = DiagnosticConfig {
            repository_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_archive_name() {
        let config = DiagnosticConfig {
            archive_path: "data/sets/crimes.zip".to_string(),
            ..Default::default()
        };
        assert_eq!(config.archive_name(), "crimes.zip");
    }
}
