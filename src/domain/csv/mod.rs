// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Value types for the decoded CSV preview
// No I/O

mod column_type;
mod encoding;
mod table_sample;

pub use column_type::ColumnType;
pub use encoding::EncodingCandidate;
pub use table_sample::{SampleColumn, TableSample};
