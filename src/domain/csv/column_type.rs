// ============================================================
// COLUMN TYPE
// ============================================================
// Scalar type inferred for a preview column

use serde::{Deserialize, Serialize};

/// Inferred scalar type of a column, named the way dataframe tools print them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Whole numbers, no missing values
    Int64,

    /// Numbers with a fractional part or with missing values
    Float64,

    /// Only boolean literals, no missing values
    Bool,

    /// Anything else (text, mixed)
    Object,
}

impl ColumnType {
    /// Infer the type from a column's values. `None` is a missing value.
    /// A column with no values at all is `Object`; one whose values are
    /// all missing is `Float64`.
    pub fn infer<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut any_missing = false;
        let mut all_int = true;
        let mut all_numeric = true;
        let mut all_bool = true;
        let mut present = 0usize;

        for value in values {
            let Some(value) = value else {
                any_missing = true;
                continue;
            };
            present += 1;
            let trimmed = value.trim();

            let is_int = trimmed.parse::<i64>().is_ok();
            let is_numeric = is_int || Self::is_float_literal(trimmed);

            all_int &= is_int;
            all_numeric &= is_numeric;
            all_bool &= Self::is_bool_literal(trimmed);
        }

        if present == 0 {
            return if any_missing {
                ColumnType::Float64
            } else {
                ColumnType::Object
            };
        }
        if all_bool && !any_missing {
            return ColumnType::Bool;
        }
        if all_int && !any_missing {
            return ColumnType::Int64;
        }
        if all_numeric {
            return ColumnType::Float64;
        }
        ColumnType::Object
    }

    /// Bytes a single value of this type occupies in a columnar frame
    pub fn value_width(&self) -> usize {
        match self {
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Object => 8,
            ColumnType::Bool => 1,
        }
    }

    fn is_bool_literal(value: &str) -> bool {
        matches!(value, "True" | "False" | "true" | "false" | "TRUE" | "FALSE")
    }

    fn is_float_literal(value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        // f64::from_str also takes "inf"/"nan" spellings; those stay text here
        let lower = value.to_ascii_lowercase();
        if lower.contains("inf") || lower.contains("nan") {
            return false;
        }
        value.parse::<f64>().is_ok()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Object => write!(f, "object"),
        }
    }
}
