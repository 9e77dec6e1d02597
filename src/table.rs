//! Header-addressed CSV tables.
//!
//! Input tables are exports from pandas: dotted column names, an optional
//! unnamed index column, and `nan`/blank for missing values. Columns are
//! looked up by header name so column order and extra columns do not matter.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::{Result, ViewerError};

#[derive(Debug)]
pub(crate) struct Table {
    pub path: PathBuf,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        Self::read_delimited(path, b',')
    }

    pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| ViewerError::io(path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = rdr.headers().map_err(|e| ViewerError::csv(path, e))?.clone();
        let mut rows = Vec::new();
        for (n, record) in rdr.records().enumerate() {
            match record {
                Ok(r) => rows.push(r),
                Err(e) => {
                    warn!(path = %path.display(), row = n + 1, error = %e, "Skipping unreadable row");
                }
            }
        }
        debug!(path = %path.display(), columns = headers.len(), rows = rows.len(), "read table");

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name).ok_or_else(|| ViewerError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }

    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Normalized cell text: missing-value markers become the empty string.
pub(crate) fn cell(record: &StringRecord, index: usize) -> &str {
    let raw = record.get(index).unwrap_or("").trim();
    if is_missing(raw) {
        ""
    } else {
        raw
    }
}

pub(crate) fn is_missing(raw: &str) -> bool {
    matches!(raw, "" | "nan" | "NaN" | "NAN" | "None" | "none" | "null" | "NaT")
}

/// Finite number in a cell, `None` for blanks, missing markers and garbage.
pub(crate) fn number(record: &StringRecord, index: usize) -> Option<f64> {
    parse_number(cell(record, index))
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
