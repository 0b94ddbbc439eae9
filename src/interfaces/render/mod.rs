//! Report renderers
//!
//! The reporter only builds a [`Report`]; these turn it into output:
//! - `TextRenderer` for terminals
//! - `JsonRenderer` for machines

mod json;
mod text;

use std::io::Write;

use crate::domain::diagnostic_config::OutputFormat;
use crate::domain::error::Result;
use crate::domain::report::Report;

pub use json::JsonRenderer;
pub use text::TextRenderer;

pub trait ReportRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<()>;
}

pub fn renderer_for(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
