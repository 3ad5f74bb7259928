pub mod read;

use crate::error::{Error, Result};
use std::fmt;

/// A single roster value. Workbook readers produce numbers and text;
/// delimited readers produce only text. Empty fields are `Missing` so the
/// transformer and renderer can tell "no value" apart from real content.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// String form used for merging, grouping and rendering. Missing cells
    /// render as the empty string, never as a null marker.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            // Workbook readers hand back integral values as floats; don't
            // print student counts as "12.0".
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Cell::Number(n) => n.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// An in-memory roster: ordered column names plus row-major cells.
/// Invariant: every row holds exactly one cell per header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));
        Table { headers, rows }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but absence is the caller's fatal error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// A new table holding only `columns`, in the given order.
    pub fn project(&self, columns: &[String]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            headers: columns.to_vec(),
            rows,
        })
    }
}
