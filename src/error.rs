use thiserror::Error;

/// Failures raised while building a [`Grid`](crate::grid::Grid) or applying a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    /// The anchor column for adjacent growth is not part of the header.
    #[error("Column '{column}' not found in header")]
    ColumnNotFound { column: String },
    /// A record does not carry the field used for key comparison.
    #[error("Record {record} is missing key field '{field}'")]
    MissingKeyValue { record: usize, field: String },
    #[error("Header contains duplicate column '{column}'")]
    DuplicateHeader { column: String },
    #[error("Row {row} has {cells} cell(s) but the header defines {columns} column(s)")]
    RowTooWide {
        row: usize,
        cells: usize,
        columns: usize,
    },
}

pub type Result<T> = std::result::Result<T, UpsertError>;
