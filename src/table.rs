// 📋 Table - in-memory tabular data with nullable text cells
// The pipeline's input/output contract is the column schema, not the file format.
// CSV reading/writing lives here so the merge stages never touch files.

use crate::error::{MergeError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;

/// Cell values treated as missing, same set a default CSV reader maps to NaN
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>",
    "#N/A",
];

/// Normalize a raw cell: trim, then map missing-value tokens to None
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name used in error messages (e.g. "user_health_data")
    pub name: String,

    /// Column names, in order
    pub headers: Vec<String>,

    /// Rows of nullable cells, each as long as `headers`
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from already-split rows; short rows are padded with nulls
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        Table {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Build a table from string literals, normalizing every cell
    pub fn from_strings(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| normalize_cell(cell)).collect())
            .collect();
        Table::new(name, headers, rows)
    }

    /// Read a CSV (header row required) from any reader.
    /// Short rows are padded with nulls; a row wider than the header is a ParseError.
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let width = headers.len();
        let mut rows = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > width {
                let line = record
                    .position()
                    .map_or(index + 2, |pos| pos.line() as usize);
                return Err(MergeError::parse(
                    name,
                    line,
                    &(width + 1).to_string(),
                    format!("row has {} cells but the header has {}", record.len(), width),
                ));
            }
            rows.push(record.iter().map(normalize_cell).collect());
        }

        Ok(Table::new(name, headers, rows))
    }

    /// Read a CSV file; the table is named after the file stem
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("table")
            .to_string();
        let file = std::fs::File::open(path)?;
        Table::from_reader(&name, file)
    }

    /// Write as CSV; nulls become empty cells
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Position of a column, or a SchemaError naming this table
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| MergeError::schema(&self.name, column))
    }

    /// Cell at (row, column index); None for nulls and out-of-range rows
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }
}

// ============================================================================
// TESTS
// ============================================================================
