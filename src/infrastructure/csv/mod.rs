// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV parsing and encoding trial

mod csv_parser;
mod encoding_trial;

pub use csv_parser::CsvParser;
pub use encoding_trial::{EncodingTrial, RewindableStream};
