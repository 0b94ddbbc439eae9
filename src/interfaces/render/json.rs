use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::{AppError, Result};
use crate::domain::report::{Report, ReportBlock};

use super::ReportRenderer;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    blocks: &'a [ReportBlock],
}

/// The report as one pretty-printed JSON document
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        let document = JsonReport {
            generated_at: Utc::now(),
            blocks: &report.blocks,
        };
        serde_json::to_writer_pretty(&mut *out, &document)
            .map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
