// ============================================================
// TABLE SAMPLE
// ============================================================
// Decoded preview of the first rows of a CSV entry

use super::{ColumnType, EncodingCandidate};
use serde::{Deserialize, Serialize};

/// Index overhead counted once per sample
const INDEX_BYTES: usize = 128;

/// Per-object overhead of a stored string
const STRING_OVERHEAD_BYTES: usize = 49;

/// Size of the placeholder stored for a missing value in a text column
const MISSING_OBJECT_BYTES: usize = 24;

/// Field values read as missing rather than as text
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A named column with its inferred type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleColumn {
    pub name: String,
    pub dtype: ColumnType,
}

/// Tabular sample produced by a successful decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSample {
    /// Encoding that decoded the sample
    pub encoding: EncodingCandidate,

    /// Columns in header order
    pub columns: Vec<SampleColumn>,

    /// Row-major cells, `None` for missing values
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableSample {
    /// Build a sample from decoded header and records. Short records are
    /// padded with missing values; callers reject long ones before this.
    pub fn from_records(
        encoding: EncodingCandidate,
        headers: Vec<String>,
        records: Vec<Vec<String>>,
    ) -> Self {
        let width = headers.len();
        let rows: Vec<Vec<Option<String>>> = records
            .into_iter()
            .map(|record| {
                let mut cells: Vec<Option<String>> = record
                    .into_iter()
                    .map(|value| {
                        if Self::is_missing(&value) {
                            None
                        } else {
                            Some(value)
                        }
                    })
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| SampleColumn {
                dtype: ColumnType::infer(rows.iter().map(|row| row[idx].as_deref())),
                name,
            })
            .collect();

        Self {
            encoding,
            columns,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Approximate footprint of the sample as a dataframe, strings included
    pub fn approx_memory_bytes(&self) -> usize {
        let mut total = INDEX_BYTES;
        for (idx, column) in self.columns.iter().enumerate() {
            total += column.dtype.value_width() * self.rows.len();
            if column.dtype == ColumnType::Object {
                total += self
                    .rows
                    .iter()
                    .map(|row| match &row[idx] {
                        Some(value) => STRING_OVERHEAD_BYTES + value.len(),
                        None => MISSING_OBJECT_BYTES,
                    })
                    .sum::<usize>();
            }
        }
        total
    }

    /// Memory figure shown in the metrics row
    pub fn approx_memory_kb(&self) -> f64 {
        self.approx_memory_bytes() as f64 / 1024.0
    }

    fn is_missing(value: &str) -> bool {
        MISSING_MARKERS.contains(&value)
    }
}
