use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract PDF text: {0}")]
    PdfExtract(String),

    #[error("page {0} is not present in the document")]
    NoPages(u32),

    #[error("expected {expected} date header entries, found {found}")]
    HeaderDates { expected: usize, found: usize },

    #[error("no table cells were found on the page")]
    EmptyTable,

    #[error("malformed table: row {row} has {found} fields, expected {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("table repair failed: {0}")]
    Repair(#[from] RepairError),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("merged dates found in column {column}, which cannot be split")]
    Irreparable { column: usize },

    #[error("row {row} has {found} fields; only rows of {expected} or one fewer can be repaired")]
    UnexpectedWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: merged cell {cell:?} cannot be assigned to a single day")]
    Ambiguous { row: usize, cell: String },
}
