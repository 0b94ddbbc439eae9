// ============================================================
// ENCODING TRIAL
// ============================================================
// Try each encoding candidate in order against a rewindable stream

use std::io::Read;

use tracing::debug;

use super::CsvParser;
use crate::domain::csv::{EncodingCandidate, TableSample};
use crate::domain::error::AppError;

/// A byte stream that can be restarted from its first byte
pub trait RewindableStream {
    /// Position the stream at its start and hand out a reader over it
    fn rewind_stream(&mut self) -> Result<Box<dyn Read + '_>, AppError>;
}

/// Runs the parser once per candidate until one succeeds
pub struct EncodingTrial<'a> {
    parser: &'a CsvParser,
    candidates: &'a [EncodingCandidate],
}

impl<'a> EncodingTrial<'a> {
    pub fn new(parser: &'a CsvParser, candidates: &'a [EncodingCandidate]) -> Self {
        Self { parser, candidates }
    }

    /// Return the sample from the first candidate that parses. Failures of
    /// earlier candidates are dropped; later candidates are never tried.
    /// `None` when every candidate failed.
    pub fn run<S: RewindableStream + ?Sized>(&self, stream: &mut S) -> Option<TableSample> {
        for &candidate in self.candidates {
            let attempt = stream
                .rewind_stream()
                .and_then(|reader| self.parser.parse_sample(reader, candidate));

            match attempt {
                Ok(sample) => return Some(sample),
                Err(err) => {
                    debug!(encoding = %candidate, error = %err, "Encoding candidate rejected");
                }
            }
        }
        None
    }
}
