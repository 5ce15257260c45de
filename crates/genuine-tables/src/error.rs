use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed {attribute} value {value:?} on row {row}, cell {cell}")]
    MalformedSpan {
        row: usize,
        cell: usize,
        attribute: &'static str,
        value: String,
    },

    #[error(
        "cell at row {row}, column {col} spans {row_span}x{col_span} past the {rows}x{cols} grid"
    )]
    SpanOverflow {
        row: usize,
        col: usize,
        row_span: usize,
        col_span: usize,
        rows: usize,
        cols: usize,
    },

    #[error("cell at row {row}, column {col} overlaps an already placed cell")]
    SpanOverlap { row: usize, col: usize },

    #[error("grid of {rows}x{cols} positions exceeds the limit of {limit}")]
    GridTooLarge {
        rows: usize,
        cols: usize,
        limit: usize,
    },

    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
