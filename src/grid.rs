//! In-memory tabular dataset.
//!
//! A [`Grid`] is a header of unique column names plus rows of text cells. Every
//! row always holds exactly one cell per header column; constructors pad short
//! rows and the column-growth helpers keep all rows aligned when a column is
//! inserted.

use std::collections::HashSet;

use crate::error::{Result, UpsertError};

pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Grid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a grid, padding rows shorter than the header with empty cells.
    pub fn new(header: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(header.len());
        for name in &header {
            if !seen.insert(name.as_str()) {
                return Err(UpsertError::DuplicateHeader {
                    column: name.clone(),
                });
            }
        }
        let columns = header.len();
        let mut rows = rows;
        for (idx, row) in rows.iter_mut().enumerate() {
            if row.len() > columns {
                return Err(UpsertError::RowTooWide {
                    row: idx,
                    cells: row.len(),
                    columns,
                });
            }
            row.resize(columns, String::new());
        }
        Ok(Grid { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Returns the cell at `row` under the exactly-named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.header, self.rows)
    }

    /// Reassembles a grid whose rows are already aligned with `header`.
    pub(crate) fn from_aligned_parts(header: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == header.len()));
        Grid { header, rows }
    }
}

/// Inserts an empty cell at `position` in every row, shifting later cells right.
///
/// When `position` equals the row length this is a plain push.
pub(crate) fn insert_blank_column(rows: &mut [Row], position: usize) {
    for row in rows.iter_mut() {
        if position >= row.len() {
            row.push(String::new());
        } else {
            row.insert(position, String::new());
        }
    }
}

pub(crate) fn blank_row(columns: usize) -> Row {
    vec![String::new(); columns]
}
