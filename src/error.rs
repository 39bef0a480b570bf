// ❗ Merge Errors - one error type for every pipeline stage
// Fail fast: the first error encountered is surfaced, nothing is recovered

use thiserror::Error;

/// Result type alias used across the library
pub type Result<T> = std::result::Result<T, MergeError>;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Coarse classification of a failure, matching the stage that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unparseable date (Loader/Typer) or a missing key value
    ParseError,
    /// Unit stripping, numeric or boolean coercion failed
    FormatError,
    /// Expected column absent
    SchemaError,
    /// Reading or writing tabular data failed
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "ParseError",
            ErrorKind::FormatError => "FormatError",
            ErrorKind::SchemaError => "SchemaError",
            ErrorKind::Io => "IoError",
        }
    }
}

// ============================================================================
// MERGE ERROR
// ============================================================================

#[derive(Error, Debug)]
pub enum MergeError {
    /// A date (or key) cell could not be parsed
    #[error("parse error in {table} row {row}, column '{column}': {message}")]
    Parse {
        table: String,
        row: usize,
        column: String,
        message: String,
    },

    /// A value had an unexpected format for its column
    #[error("format error in column '{column}' (value {value:?}): {message}")]
    Format {
        column: String,
        value: String,
        message: String,
    },

    /// A required column is missing
    #[error("schema error: table '{table}' has no column '{column}'")]
    Schema { table: String, column: String },

    /// Options file could not be understood
    #[error("invalid merge options: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    pub fn parse(table: &str, row: usize, column: &str, message: impl Into<String>) -> Self {
        MergeError::Parse {
            table: table.to_string(),
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }

    pub fn format(column: &str, value: &str, message: impl Into<String>) -> Self {
        MergeError::Format {
            column: column.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    pub fn schema(table: &str, column: &str) -> Self {
        MergeError::Schema {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::Parse { .. } => ErrorKind::ParseError,
            MergeError::Format { .. } | MergeError::Config(_) => ErrorKind::FormatError,
            MergeError::Schema { .. } => ErrorKind::SchemaError,
            MergeError::Csv(_) | MergeError::Io(_) => ErrorKind::Io,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
