//! Report model
//! The ordered, append-only sequence of blocks a diagnostic run produces.
//! Renderers consume it; the reporter never formats output itself.

use super::csv::TableSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Marker printed in front of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMarker {
    Archive,
    Document,
}

/// One cell of the metrics row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single render command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum ReportBlock {
    Title { text: String },
    Heading { text: String },
    Divider,
    Banner { severity: Severity, message: String },
    /// Collapsible panel, one line per item
    Details { title: String, lines: Vec<String> },
    Text { text: String },
    /// Directory entry flagged as archive or not
    Entry { marker: EntryMarker, name: String },
    Metrics { cells: Vec<Metric> },
    Table { sample: TableSample },
    Code { text: String },
    Caption { text: String },
}

/// Ordered render commands of one diagnostic run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub blocks: Vec<ReportBlock>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: ReportBlock) {
        self.blocks.push(block);
    }

    pub fn emit(&mut self, severity: Severity, message: impl Into<String>) {
        self.push(ReportBlock::Banner {
            severity,
            message: message.into(),
        });
    }

    pub fn emit_table(&mut self, sample: TableSample) {
        self.push(ReportBlock::Table { sample });
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        self.push(ReportBlock::Heading { text: text.into() });
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.push(ReportBlock::Text { text: text.into() });
    }

    pub fn divider(&mut self) {
        self.push(ReportBlock::Divider);
    }

    /// Banners in emission order
    pub fn banners(&self) -> impl Iterator<Item = (Severity, &str)> {
        self.blocks.iter().filter_map(|block| match block {
            ReportBlock::Banner { severity, message } => Some((*severity, message.as_str())),
            _ => None,
        })
    }

    /// The preview table, if the run got that far
    pub fn table(&self) -> Option<&TableSample> {
        self.blocks.iter().find_map(|block| match block {
            ReportBlock::Table { sample } => Some(sample),
            _ => None,
        })
    }

    pub fn has_banner(&self, severity: Severity, needle: &str) -> bool {
        self.banners()
            .any(|(s, message)| s == severity && message.contains(needle))
    }
}
