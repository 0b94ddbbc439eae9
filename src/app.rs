use std::io::Write;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::application::DiagnosticReporter;
use crate::domain::diagnostic_config::DiagnosticConfig;
use crate::domain::error::Result;
use crate::domain::report::Report;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::render::renderer_for;

/// Logs go to stderr so stdout carries only the report
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the diagnostic described by `config` and write it to `out`
pub fn run_with(config: &DiagnosticConfig, out: &mut dyn Write) -> Result<Report> {
    info!(archive = %config.archive_path, output = %config.output, "Starting diagnostic");
    let report = DiagnosticReporter::new(config.clone()).run();
    renderer_for(config.output).render(&report, out)?;
    Ok(report)
}

pub fn run() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ConfigService::new().load_or_default();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = run_with(&config, &mut out) {
        error!(error = %err, "Failed to write report");
    }
}
