//! Span-annotated cell grid.
//!
//! A [`Grid`] holds the rows of one source table in reading order. Every
//! [`Cell`] keeps an opaque payload (the markup element it came from) next to
//! its span bookkeeping. Validation mutates `row_span` and the alignment flag,
//! so every validation pass works on its own clone of the grid.

/// One table cell with its span state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<P> {
    payload: P,
    pub(crate) row_span: usize,
    pub(crate) col_span: usize,
    row_span_original: usize,
    col_span_original: usize,
    pub(crate) aligned: bool,
}

impl<P> Cell<P> {
    /// Creates a cell covering `row_span` rows and `col_span` columns.
    ///
    /// Spans are clamped to at least one; zero spans are rejected earlier by
    /// the document adapter.
    pub fn new(payload: P, row_span: usize, col_span: usize) -> Self {
        let row_span = row_span.max(1);
        let col_span = col_span.max(1);
        Self {
            payload,
            row_span,
            col_span,
            row_span_original: row_span,
            col_span_original: col_span,
            aligned: false,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Rows still covered by this cell, counting the current one.
    #[must_use]
    pub fn row_span(&self) -> usize {
        self.row_span
    }

    #[must_use]
    pub fn col_span(&self) -> usize {
        self.col_span
    }

    #[must_use]
    pub fn row_span_original(&self) -> usize {
        self.row_span_original
    }

    #[must_use]
    pub fn col_span_original(&self) -> usize {
        self.col_span_original
    }

    /// Whether the cell was found to start exactly on a column boundary of the
    /// row above it.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    /// True when the cell's vertical extent started in an earlier row and is
    /// still running.
    pub(crate) fn is_active_carry(&self) -> bool {
        self.row_span > 0 && self.row_span < self.row_span_original
    }
}

impl<P: Clone> Cell<P> {
    /// The same cell seen with rows and columns exchanged.
    pub(crate) fn transposed(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            row_span: self.col_span,
            col_span: self.row_span,
            row_span_original: self.col_span_original,
            col_span_original: self.row_span_original,
            aligned: self.aligned,
        }
    }
}

/// Rows of cells in reading order. Rows never hold zero cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<P> {
    rows: Vec<Vec<Cell<P>>>,
}

impl<P> Default for Grid<P> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<P> Grid<P> {
    /// Builds a grid, dropping rows that have no cells.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Cell<P>>>,
    {
        Self {
            rows: rows.into_iter().filter(|row| !row.is_empty()).collect(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell<P>>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Total column width, as defined by the first row. Saturates at
    /// `usize::MAX`.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| {
            row.iter()
                .fold(0, |width: usize, cell| width.saturating_add(cell.col_span))
        })
    }

    /// `(row_span, col_span)` of every cell, row by row.
    #[must_use]
    pub fn spans(&self) -> Vec<Vec<(usize, usize)>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| (cell.row_span, cell.col_span)).collect())
            .collect()
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<Cell<P>>> {
        self.rows
    }
}

impl<P: Clone> Grid<P> {
    /// Payloads of every cell, row by row.
    #[must_use]
    pub fn payloads(&self) -> Vec<Vec<P>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.payload.clone()).collect())
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn grid_of<P: Clone>(rows: &[&[(P, usize, usize)]]) -> Grid<P> {
    Grid::from_rows(rows.iter().map(|row| {
        row.iter()
            .map(|(payload, row_span, col_span)| Cell::new(payload.clone(), *row_span, *col_span))
            .collect()
    }))
}
