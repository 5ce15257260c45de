//! Sheet layout of a classified table: one merged region per cell, placed on
//! the dense matrix of the winning view.

use scraper::ElementRef;

use crate::classify::{Classified, Orientation};
use crate::error::TableError;
use crate::options::MergedFill;
use crate::transform::place;

/// Rendered text of a cell payload.
pub trait CellText {
    fn cell_text(&self) -> String;
}

impl CellText for ElementRef<'_> {
    /// Text fragments, trimmed, joined by single spaces.
    fn cell_text(&self) -> String {
        self.text()
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRegion {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub value: String,
}

impl MergedRegion {
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub table_id: usize,
    pub name: String,
    pub orientation: Orientation,
    pub rows: usize,
    pub cols: usize,
    pub regions: Vec<MergedRegion>,
}

impl SheetLayout {
    /// Lays out the classified view of table `table_id` (1-based).
    ///
    /// # Errors
    ///
    /// Fails when the view's spans cannot be placed on its matrix.
    pub fn from_classified<P: CellText>(
        table_id: usize,
        classified: &Classified<P>,
    ) -> Result<Self, TableError> {
        let placement = place(&classified.grid)?;
        let regions = classified
            .grid
            .rows()
            .iter()
            .flatten()
            .zip(&placement.anchors)
            .map(|(cell, &(row, col))| MergedRegion {
                row,
                col,
                row_span: cell.row_span(),
                col_span: cell.col_span(),
                value: cell.payload().cell_text(),
            })
            .collect();

        Ok(Self {
            table_id,
            name: format!("Table_{table_id}"),
            orientation: classified.orientation,
            rows: placement.rows,
            cols: placement.cols,
            regions,
        })
    }

    /// Flattens the regions into a `rows x cols` matrix of values.
    #[must_use]
    pub fn to_rows(&self, fill: MergedFill) -> Vec<Vec<String>> {
        let mut matrix = vec![vec![String::new(); self.cols]; self.rows];
        for region in &self.regions {
            match fill {
                MergedFill::Anchor => {
                    if let Some(slot) = matrix
                        .get_mut(region.row)
                        .and_then(|row| row.get_mut(region.col))
                    {
                        slot.clone_from(&region.value);
                    }
                }
                MergedFill::Repeat => {
                    for row in matrix
                        .iter_mut()
                        .skip(region.row)
                        .take(region.row_span)
                    {
                        for slot in row.iter_mut().skip(region.col).take(region.col_span) {
                            slot.clone_from(&region.value);
                        }
                    }
                }
            }
        }
        matrix
    }
}
