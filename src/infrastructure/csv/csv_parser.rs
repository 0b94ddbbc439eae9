// ============================================================
// CSV PARSER
// ============================================================
// Parse the head of a CSV byte stream under a given text encoding

use std::collections::HashMap;
use std::io::Read;

use csv::{ByteRecord, ReaderBuilder};

use crate::domain::csv::{EncodingCandidate, TableSample};
use crate::domain::diagnostic_config::DEFAULT_PREVIEW_ROWS;
use crate::domain::error::AppError;

const DELIMITER: u8 = b',';
const QUOTE: u8 = b'"';

/// CSV parser that decodes a capped sample of rows
pub struct CsvParser {
    /// Maximum number of data rows read after the header
    max_rows: usize,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of data rows
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Parse the header and up to `max_rows` records from `reader`,
    /// decoding every field with `encoding`. Stops reading once the cap is hit.
    pub fn parse_sample<R: Read>(
        &self,
        reader: R,
        encoding: EncodingCandidate,
    ) -> Result<TableSample, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .quote(QUOTE)
            .has_headers(false)
            .flexible(true)
            .from_reader(QuoteTracker::new(reader));

        let mut header = ByteRecord::new();
        if !reader.read_byte_record(&mut header)? {
            return Err(AppError::ParseError(
                "No columns to parse from file".to_string(),
            ));
        }

        let raw_headers = self.decode_record(&header, encoding, true)?;
        let headers = Self::normalize_headers(raw_headers);
        let width = headers.len();

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        while rows.len() < self.max_rows && reader.read_byte_record(&mut record)? {
            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(AppError::ParseError(format!(
                    "Error tokenizing data. Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }
            rows.push(self.decode_record(&record, encoding, false)?);
        }

        // The csv reader closes a dangling quoted field at EOF without error
        if reader.is_done() && reader.get_ref().inside_quotes() {
            return Err(AppError::ParseError(
                "Error tokenizing data. EOF inside string".to_string(),
            ));
        }

        Ok(TableSample::from_records(encoding, headers, rows))
    }

    /// Decode every field of a record, failing on the first invalid one
    fn decode_record(
        &self,
        record: &ByteRecord,
        encoding: EncodingCandidate,
        is_header: bool,
    ) -> Result<Vec<String>, AppError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        record
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let field = if is_header && idx == 0 {
                    encoding.strip_bom(field)
                } else {
                    field
                };
                encoding
                    .decode(field)
                    .map(|text| text.into_owned())
                    .ok_or_else(|| {
                        AppError::DecodeError(format!(
                            "'{}' codec can't decode field {} in line {}",
                            encoding, idx, line
                        ))
                    })
            })
            .collect()
    }

    /// Blank header names become `Unnamed: <idx>`, repeated names get `.<n>`
    fn normalize_headers(raw: Vec<String>) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();

        raw.into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let name = if name.is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    name
                };
                let count = seen.entry(name.clone()).or_insert(0);
                let unique = if *count == 0 {
                    name
                } else {
                    format!("{}.{}", name, count)
                };
                *count += 1;
                unique
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Reader that follows the quoting state of every byte handed to the csv
/// reader, so a quoted field left open at EOF can be told apart
struct QuoteTracker<R> {
    inner: R,
    state: FieldState,
}

impl<R: Read> QuoteTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            state: FieldState::Start,
        }
    }

    fn inside_quotes(&self) -> bool {
        self.state == FieldState::Quoted
    }

    fn advance(&mut self, byte: u8) {
        let boundary = byte == DELIMITER || byte == b'\n' || byte == b'\r';
        self.state = match self.state {
            FieldState::Start | FieldState::Unquoted if boundary => FieldState::Start,
            FieldState::Start if byte == QUOTE => FieldState::Quoted,
            FieldState::Start | FieldState::Unquoted => FieldState::Unquoted,
            FieldState::Quoted if byte == QUOTE => FieldState::QuoteInQuoted,
            FieldState::Quoted => FieldState::Quoted,
            // A doubled quote is an escaped one
            FieldState::QuoteInQuoted if byte == QUOTE => FieldState::Quoted,
            FieldState::QuoteInQuoted if boundary => FieldState::Start,
            FieldState::QuoteInQuoted => FieldState::Unquoted,
        };
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            self.advance(byte);
        }
        Ok(n)
    }
}
