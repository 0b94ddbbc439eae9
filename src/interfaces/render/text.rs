use std::io::Write;

use crate::domain::csv::TableSample;
use crate::domain::error::Result;
use crate::domain::report::{EntryMarker, Metric, Report, ReportBlock, Severity};

use super::ReportRenderer;

const RULE_WIDTH: usize = 60;
const MAX_CELL_WIDTH: usize = 24;
const MISSING_CELL: &str = "NaN";

/// Plain-text terminal output
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        for block in &report.blocks {
            match block {
                ReportBlock::Title { text } => {
                    writeln!(out, "{}", text)?;
                    writeln!(out, "{}", "=".repeat(text.chars().count()))?;
                }
                ReportBlock::Heading { text } => {
                    writeln!(out)?;
                    writeln!(out, "## {}", text)?;
                }
                ReportBlock::Divider => writeln!(out, "{}", "-".repeat(RULE_WIDTH))?,
                ReportBlock::Banner { severity, message } => {
                    write_banner(out, *severity, message)?
                }
                ReportBlock::Details { title, lines } => {
                    writeln!(out, "> {}", title)?;
                    for line in lines {
                        writeln!(out, "    - {}", line)?;
                    }
                }
                ReportBlock::Text { text } => writeln!(out, "{}", text)?,
                ReportBlock::Entry { marker, name } => {
                    let tag = match marker {
                        EntryMarker::Archive => "[zip] ",
                        EntryMarker::Document => "[file]",
                    };
                    writeln!(out, "{} `{}`", tag, name)?;
                }
                ReportBlock::Metrics { cells } => writeln!(out, "{}", format_metrics(cells))?,
                ReportBlock::Table { sample } => {
                    for line in format_table(sample) {
                        writeln!(out, "{}", line)?;
                    }
                }
                ReportBlock::Code { text } => {
                    for line in text.lines() {
                        writeln!(out, "    {}", line)?;
                    }
                }
                ReportBlock::Caption { text } => writeln!(out, "  {}", text)?,
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[OK]",
        Severity::Info => "[INFO]",
        Severity::Warning => "[WARN]",
        Severity::Error => "[ERROR]",
    }
}

fn write_banner(out: &mut dyn Write, severity: Severity, message: &str) -> std::io::Result<()> {
    let tag = severity_tag(severity);
    let indent = " ".repeat(tag.len() + 1);
    for (idx, line) in message.lines().enumerate() {
        if idx == 0 {
            writeln!(out, "{} {}", tag, line)?;
        } else if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "{}{}", indent, line)?;
        }
    }
    Ok(())
}

fn format_metrics(cells: &[Metric]) -> String {
    cells
        .iter()
        .map(|m| format!("{}: {}", m.label, m.value))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    }
}

/// Fixed-width grid with a leading row index
fn format_table(sample: &TableSample) -> Vec<String> {
    let header: Vec<String> = std::iter::once(String::new())
        .chain(sample.columns.iter().map(|c| clip(&c.name)))
        .collect();

    let body: Vec<Vec<String>> = sample
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            std::iter::once(idx.to_string())
                .chain(
                    row.iter()
                        .map(|cell| clip(cell.as_deref().unwrap_or(MISSING_CELL))),
                )
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let render_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", " ".repeat(pad), cell)
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(render_row(&header));
    for row in &body {
        lines.push(render_row(row));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::EncodingCandidate;

    fn render(report: &Report) -> String {
        let mut out = Vec::new();
        TextRenderer.render(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_banner_tags() {
        let mut report = Report::new();
        report.emit(Severity::Success, "found");
        report.emit(Severity::Error, "broken\nsecond line");

        let text = render(&report);
        assert!(text.contains("[OK] found\n"));
        assert!(text.contains("[ERROR] broken\n        second line\n"));
    }

    #[test]
    fn test_table_alignment() {
        let sample = TableSample::from_records(
            EncodingCandidate::Utf8,
            vec!["id".to_string(), "city".to_string()],
            vec![
                vec!["1".to_string(), "Tunja".to_string()],
                vec!["22".to_string(), String::new()],
            ],
        );
        let lines = format_table(&sample);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   id   city");
        assert_eq!(lines[1], "0   1  Tunja");
        assert_eq!(lines[2], "1  22    NaN");
    }

    #[test]
    fn test_long_cells_clipped() {
        let long = "x".repeat(40);
        assert_eq!(clip(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(clip(&long).ends_with("..."));
        assert_eq!(clip("short"), "short");
    }

    #[test]
    fn test_entry_markers() {
        let mut report = Report::new();
        report.push(ReportBlock::Entry {
            marker: EntryMarker::Archive,
            name: "old.zip".to_string(),
        });
        report.push(ReportBlock::Entry {
            marker: EntryMarker::Document,
            name: "app.py".to_string(),
        });

        let text = render(&report);
        assert!(text.contains("[zip]  `old.zip`"));
        assert!(text.contains("[file] `app.py`"));
    }
}
