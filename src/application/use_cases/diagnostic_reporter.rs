// ============================================================
// DIAGNOSTIC REPORTER USE CASE
// ============================================================
// Run the archive checks in order and record what happened

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::csv::{EncodingCandidate, TableSample};
use crate::domain::diagnostic_config::DiagnosticConfig;
use crate::domain::error::DiagnosticError;
use crate::domain::report::{EntryMarker, Metric, Report, ReportBlock, Severity};
use crate::infrastructure::archive::DatasetArchive;
use crate::infrastructure::csv::{CsvParser, EncodingTrial};
use crate::infrastructure::storage::{LocalWorkspace, Workspace};

/// Extension that flags a directory entry as an archive
const ARCHIVE_SUFFIX: &str = ".zip";

/// Diagnostic reporter use case
pub struct DiagnosticReporter {
    config: DiagnosticConfig,
    workspace: Box<dyn Workspace>,
}

impl DiagnosticReporter {
    /// Create a new reporter over the local filesystem
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            config,
            workspace: Box::new(LocalWorkspace::new()),
        }
    }

    /// Probe `dir` instead of the current working directory
    pub fn with_working_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.with_workspace(LocalWorkspace::rooted(dir))
    }

    /// Run the steps against another filesystem view
    pub fn with_workspace(mut self, workspace: impl Workspace + 'static) -> Self {
        self.workspace = Box::new(workspace);
        self
    }

    /// Run every step and return the full report. Never fails: a fatal step
    /// ends the archive section and the footer is still emitted.
    pub fn run(&self) -> Report {
        let mut report = Report::new();
        report.push(ReportBlock::Title {
            text: self.config.title.clone(),
        });

        let mut base = PathBuf::from(".");
        match self.run_steps(&mut report, &mut base) {
            Ok(sample) => info!(
                encoding = %sample.encoding,
                columns = sample.column_count(),
                rows = sample.row_count(),
                "Diagnostic completed"
            ),
            Err(err) => {
                warn!(error = %err, "Diagnostic stopped");
                self.report_failure(&mut report, &base, &err);
            }
        }

        report.divider();
        report.push(ReportBlock::Caption {
            text: self.config.footer.clone(),
        });
        report
    }

    /// Every step in order. `base` ends up as the directory the archive
    /// path is resolved against.
    fn run_steps(
        &self,
        report: &mut Report,
        base: &mut PathBuf,
    ) -> Result<TableSample, DiagnosticError> {
        report.heading("System information");
        *base = self.probe_environment(report)?;

        report.divider();
        report.heading("Trying to load the ZIP archive...");
        self.check_archive(report, base.as_path())
    }

    /// Report a failed step. Non-fatal failures are absorbed and the run
    /// goes on; fatal ones are handed back to stop it.
    fn tolerate(
        &self,
        report: &mut Report,
        base: &Path,
        err: DiagnosticError,
    ) -> Result<(), DiagnosticError> {
        if err.is_fatal() {
            return Err(err);
        }
        warn!(error = %err, "Step failed, continuing");
        self.report_failure(report, base, &err);
        Ok(())
    }

    /// Step 1
    fn probe_environment(&self, report: &mut Report) -> Result<PathBuf, DiagnosticError> {
        let base = match self.workspace.working_dir() {
            Ok(dir) => {
                report.emit(
                    Severity::Success,
                    format!("Current directory: `{}`", dir.display()),
                );
                dir
            }
            Err(err) => {
                let fallback = PathBuf::from(".");
                self.tolerate(report, &fallback, err)?;
                fallback
            }
        };

        match self.workspace.list_dir(&base) {
            Ok(mut names) => {
                report.emit(Severity::Success, format!("Files found: {}", names.len()));
                names.sort();
                report.push(ReportBlock::Details {
                    title: "Full file list".to_string(),
                    lines: names,
                });
            }
            Err(err) => self.tolerate(report, &base, err)?,
        }

        Ok(base)
    }

    /// Steps 2 to 7. Emits progress as it goes and stops at the first fatal
    /// failure, which the caller reports.
    fn check_archive(
        &self,
        report: &mut Report,
        base: &Path,
    ) -> Result<TableSample, DiagnosticError> {
        let archive_path = base.join(&self.config.archive_path);

        // Step 2: presence
        if !self.workspace.exists(&archive_path) {
            return Err(DiagnosticError::ArchiveMissing(
                self.config.archive_path.clone(),
            ));
        }
        info!(path = %archive_path.display(), "Archive found");
        report.emit(
            Severity::Success,
            format!("ZIP file found: `{}`", self.config.archive_path),
        );

        // Step 3: size
        match self.workspace.size_mb(&archive_path) {
            Ok(size_mb) => report.emit(Severity::Info, format!("File size: {:.2} MB", size_mb)),
            Err(err) => self.tolerate(report, base, err)?,
        }

        // Step 4: validity and listing. The archive is dropped on every
        // return path below.
        let mut archive = DatasetArchive::<File>::open(&archive_path)?;
        let names = archive.entry_names();
        report.emit(
            Severity::Success,
            format!("Valid ZIP with {} file(s)", names.len()),
        );
        report.text("Files inside the ZIP:");
        for name in names {
            report.text(format!("- `{}`", name));
        }

        // Step 5: CSV discovery
        let (index, csv_name) = archive
            .first_csv()
            .map(|(index, name)| (index, name.to_string()))
            .ok_or(DiagnosticError::NoCsvEntry)?;
        report.emit(Severity::Info, format!("Trying to read: `{}`", csv_name));

        // Step 6: encoding trial
        let parser = CsvParser::new().with_max_rows(self.config.preview_rows);
        let trial = EncodingTrial::new(&parser, &EncodingCandidate::TRIAL_ORDER);
        let mut stream = archive.entry_stream(index)?;
        let sample = trial
            .run(&mut stream)
            .ok_or_else(|| DiagnosticError::Undecodable(csv_name.clone()))?;
        info!(entry = %csv_name, encoding = %sample.encoding, "CSV decoded");
        report.emit(
            Severity::Success,
            format!("CSV loaded with encoding: `{}`", sample.encoding),
        );

        // Step 7: preview
        self.render_preview(report, &sample);
        Ok(sample)
    }

    fn render_preview(&self, report: &mut Report, sample: &TableSample) {
        report.divider();
        report.heading("Data loaded successfully!");
        report.push(ReportBlock::Metrics {
            cells: vec![
                Metric::new("Columns", sample.column_count().to_string()),
                Metric::new("Rows (sample)", sample.row_count().to_string()),
                Metric::new("Memory", format!("{:.1} KB", sample.approx_memory_kb())),
            ],
        });

        report.text("Preview:");
        report.emit_table(sample.clone());

        report.text("Available columns:");
        for column in &sample.columns {
            report.text(format!("- `{}` ({})", column.name, column.dtype));
        }

        report.emit(
            Severity::Success,
            "Everything works. The dataset can be loaded.",
        );
    }

    /// Blocks for a failed step
    fn report_failure(&self, report: &mut Report, base: &Path, err: &DiagnosticError) {
        match err {
            DiagnosticError::ArchiveMissing(path) => {
                report.emit(Severity::Error, format!("File not found: `{}`", path));
                report.emit(Severity::Warning, "Files available in the directory:");
                match self.workspace.list_dir(base) {
                    Ok(names) => {
                        for name in names {
                            let marker = if name.ends_with(ARCHIVE_SUFFIX) {
                                EntryMarker::Archive
                            } else {
                                EntryMarker::Document
                            };
                            report.push(ReportBlock::Entry { marker, name });
                        }
                    }
                    Err(_) => report.text("Could not list the files"),
                }
                report.divider();
                report.emit(Severity::Info, self.remediation());
            }
            DiagnosticError::InvalidArchive(_) => {
                report.emit(Severity::Error, "The file is not a valid ZIP or is corrupt");
                report.emit(Severity::Info, "Try compressing the CSV file again");
            }
            DiagnosticError::ArchiveOpen { message, trace } => {
                report.emit(Severity::Error, format!("Error opening ZIP: {}", message));
                report.push(ReportBlock::Code {
                    text: trace.clone(),
                });
            }
            DiagnosticError::NoCsvEntry => {
                report.emit(Severity::Error, "No CSV files found inside the ZIP");
            }
            DiagnosticError::CsvRead { message, trace } => {
                report.emit(Severity::Error, format!("Error reading CSV: {}", message));
                report.push(ReportBlock::Code {
                    text: trace.clone(),
                });
            }
            DiagnosticError::Undecodable(_) => {
                report.emit(Severity::Error, "Could not read the CSV with any encoding");
            }
            DiagnosticError::Environment(message) => {
                report.emit(Severity::Error, message.clone());
            }
            DiagnosticError::SizeProbe(_) => {
                report.emit(Severity::Warning, err.to_string());
            }
        }
    }

    fn remediation(&self) -> String {
        let name = self.config.archive_name();
        let repository = match &self.config.repository_url {
            Some(url) => format!("1. Open the repository: {}", url),
            None => "1. Open the repository or folder this app is deployed from".to_string(),
        };

        format!(
            "Fix:\n\n\
             {}\n\
             2. Check that `{}` is at its root\n\
             3. If it is not, upload it (Add file -> Upload files)\n\
             4. Make sure the name is exactly `{}`",
            repository, name, name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Local filesystem with selected operations failing
    #[derive(Default)]
    struct FaultyWorkspace {
        inner: LocalWorkspace,
        no_working_dir: bool,
        no_listing: bool,
        no_size: bool,
    }

    impl Workspace for FaultyWorkspace {
        fn working_dir(&self) -> Result<PathBuf, DiagnosticError> {
            if self.no_working_dir {
                return Err(DiagnosticError::Environment(
                    "Error getting directory: gone".to_string(),
                ));
            }
            self.inner.working_dir()
        }

        fn list_dir(&self, dir: &Path) -> Result<Vec<String>, DiagnosticError> {
            if self.no_listing {
                return Err(DiagnosticError::Environment(
                    "Error listing files: permission denied".to_string(),
                ));
            }
            self.inner.list_dir(dir)
        }

        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }

        fn size_mb(&self, path: &Path) -> Result<f64, DiagnosticError> {
            if self.no_size {
                return Err(DiagnosticError::SizeProbe("permission denied".to_string()));
            }
            self.inner.size_mb(path)
        }
    }

    fn write_dataset(dir: &Path) -> PathBuf {
        let path = dir.join("dataset.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("data.csv", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"city,total\nTunja,4\n").unwrap();
        writer.finish().unwrap();
        path
    }

    fn position(report: &Report, severity: Severity, needle: &str) -> usize {
        report
            .banners()
            .position(|(s, m)| s == severity && m.contains(needle))
            .unwrap_or_else(|| panic!("no {:?} banner containing {:?}", severity, needle))
    }

    #[test]
    fn test_listing_error_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let config = DiagnosticConfig {
            archive_path: "dataset.zip".to_string(),
            ..Default::default()
        };

        let report = DiagnosticReporter::new(config)
            .with_workspace(FaultyWorkspace {
                inner: LocalWorkspace::rooted(dir.path()),
                no_listing: true,
                ..Default::default()
            })
            .run();

        let listing = position(&report, Severity::Error, "Error listing files");
        let found = position(&report, Severity::Success, "ZIP file found");
        assert!(listing < found);
        assert!(report.has_banner(Severity::Success, "encoding: `utf-8`"));
        assert!(report.table().is_some());
    }

    #[test]
    fn test_working_dir_error_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(dir.path());
        let config = DiagnosticConfig {
            archive_path: path.to_string_lossy().into_owned(),
            ..Default::default()
        };

        let report = DiagnosticReporter::new(config)
            .with_workspace(FaultyWorkspace {
                no_working_dir: true,
                ..Default::default()
            })
            .run();

        let env = position(&report, Severity::Error, "Error getting directory: gone");
        let valid = position(&report, Severity::Success, "Valid ZIP with 1 file(s)");
        assert!(env < valid);
        assert!(!report.has_banner(Severity::Success, "Current directory"));
        assert!(report.table().is_some());
    }

    #[test]
    fn test_size_error_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let config = DiagnosticConfig {
            archive_path: "dataset.zip".to_string(),
            ..Default::default()
        };

        let report = DiagnosticReporter::new(config)
            .with_workspace(FaultyWorkspace {
                inner: LocalWorkspace::rooted(dir.path()),
                no_size: true,
                ..Default::default()
            })
            .run();

        let found = position(&report, Severity::Success, "ZIP file found");
        let size = position(
            &report,
            Severity::Warning,
            "Could not read file size: permission denied",
        );
        let valid = position(&report, Severity::Success, "Valid ZIP with 1 file(s)");
        assert!(found < size && size < valid);
        assert!(!report.has_banner(Severity::Info, "File size"));
        assert!(!report.banners().any(|(s, _)| s == Severity::Error));
        assert!(report.has_banner(Severity::Success, "Everything works"));
    }

    #[test]
    fn test_remediation_mentions_archive_and_repository() {
        let reporter = DiagnosticReporter::new(DiagnosticConfig {
            archive_path: "data/crimes.zip".to_string(),
            repository_url: Some("https://example.com/org/repo".to_string()),
            ..Default::default()
        });

        let text = reporter.remediation();
        assert!(text.contains("`crimes.zip`"));
        assert!(text.contains("https://example.com/org/repo"));
    }

    #[test]
    fn test_footer_always_emitted() {
        let dir = tempfile::tempdir().unwrap();
        let report = DiagnosticReporter::new(DiagnosticConfig::default())
            .with_working_dir(dir.path())
            .run();

        assert!(matches!(
            report.blocks.last(),
            Some(ReportBlock::Caption { .. })
        ));
        assert!(matches!(
            report.blocks.first(),
            Some(ReportBlock::Title { .. })
        ));
    }
}
