//! Derived grids: transpose and horizontal flip.
//!
//! Both transforms work on payload clones; the source grid is never touched.
//! The four header orientations are fixed compositions of these two
//! primitives (see [`crate::Orientation::derive`]).

use crate::error::TableError;
use crate::grid::Grid;

/// Upper bound on the dense matrix a grid may expand into.
pub const MAX_GRID_POSITIONS: usize = 1_000_000;

/// Dense placement of a grid: every matrix position holds the index of the
/// cell covering it, cells numbered in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub rows: usize,
    pub cols: usize,
    pub slots: Vec<Vec<Option<usize>>>,
    pub anchors: Vec<(usize, usize)>,
}

/// Lays the grid out on a `row_count x width` matrix. Each cell takes the
/// first free column of its row and covers its full span.
///
/// Spans that run past the matrix or collide with a placed cell are errors.
pub(crate) fn place<P>(grid: &Grid<P>) -> Result<Placement, TableError> {
    let rows = grid.row_count();
    let cols = grid.width();
    if rows.saturating_mul(cols) > MAX_GRID_POSITIONS {
        return Err(TableError::GridTooLarge {
            rows,
            cols,
            limit: MAX_GRID_POSITIONS,
        });
    }

    let mut slots = vec![vec![None; cols]; rows];
    let mut anchors = Vec::new();

    for (row_index, row) in grid.rows().iter().enumerate() {
        let mut col = 0;
        for cell in row {
            while col < cols && slots[row_index][col].is_some() {
                col += 1;
            }

            let bottom = row_index.saturating_add(cell.row_span());
            let right = col.saturating_add(cell.col_span());
            if bottom > rows || right > cols {
                return Err(TableError::SpanOverflow {
                    row: row_index,
                    col,
                    row_span: cell.row_span(),
                    col_span: cell.col_span(),
                    rows,
                    cols,
                });
            }

            let id = anchors.len();
            for (r, slot_row) in slots.iter_mut().enumerate().take(bottom).skip(row_index) {
                for (c, slot) in slot_row.iter_mut().enumerate().take(right).skip(col) {
                    if slot.is_some() {
                        return Err(TableError::SpanOverlap { row: r, col: c });
                    }
                    *slot = Some(id);
                }
            }
            anchors.push((row_index, col));
            col = right;
        }
    }

    Ok(Placement {
        rows,
        cols,
        slots,
        anchors,
    })
}

/// Exchanges rows and columns. Each cell keeps its payload and has its row
/// and column spans swapped.
///
/// # Errors
///
/// Fails when a cell does not fit the nominal grid or overlaps another cell;
/// such grids have no well-defined transpose.
pub fn transpose<P: Clone>(grid: &Grid<P>) -> Result<Grid<P>, TableError> {
    let placement = place(grid)?;
    let cells = grid.rows().iter().flatten().collect::<Vec<_>>();
    let mut emitted = vec![false; cells.len()];

    let rows = (0..placement.cols).map(|col| {
        let mut row = Vec::new();
        for slot_row in &placement.slots {
            if let Some(id) = slot_row[col]
                && !emitted[id]
            {
                emitted[id] = true;
                row.push(cells[id].transposed());
            }
        }
        row
    });

    Ok(Grid::from_rows(rows))
}

/// Reverses the cell order of every row. Spans are unchanged.
#[must_use]
pub fn flip<P: Clone>(grid: &Grid<P>) -> Grid<P> {
    Grid::from_rows(
        grid.rows()
            .iter()
            .map(|row| row.iter().rev().cloned().collect::<Vec<_>>()),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{flip, place, transpose};
    use crate::error::TableError;
    use crate::grid::grid_of;

    #[test]
    fn transposes_plain_grid() {
        let grid = grid_of(&[&[("a", 1, 1), ("b", 1, 1)], &[("c", 1, 1), ("d", 1, 1)]]);
        let transposed = transpose(&grid).expect("grid should transpose");

        assert_eq!(transposed.payloads(), vec![vec!["a", "c"], vec!["b", "d"]]);
    }

    #[test]
    fn transpose_swaps_spans_and_collapses_regions() {
        let grid = grid_of(&[
            &[("head", 1, 2), ("side", 2, 1)],
            &[("x", 1, 1), ("y", 1, 1)],
        ]);
        let transposed = transpose(&grid).expect("grid should transpose");

        assert_eq!(
            transposed.payloads(),
            vec![vec!["head", "x"], vec!["y"], vec!["side"]]
        );
        assert_eq!(
            transposed.spans(),
            vec![vec![(2, 1), (1, 1)], vec![(1, 1)], vec![(1, 2)]]
        );
    }

    #[test]
    fn transpose_twice_restores_structure() {
        let grid = grid_of(&[
            &[("u", 1, 4)],
            &[("y1", 1, 2), ("y2", 1, 2)],
            &[("a", 1, 1), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1)],
        ]);
        let back = transpose(&transpose(&grid).expect("first transpose"))
            .expect("second transpose");

        assert_eq!(back, grid);
    }

    #[test]
    fn flip_twice_restores_structure() {
        let grid = grid_of(&[&[("a", 2, 1), ("b", 1, 1)], &[("c", 1, 1)]]);
        let flipped = flip(&grid);

        assert_eq!(flipped.payloads(), vec![vec!["b", "a"], vec!["c"]]);
        assert_eq!(flip(&flipped), grid);
    }

    #[test]
    fn placement_skips_columns_held_by_row_spans() {
        let grid = grid_of(&[
            &[("a", 1, 1), ("b", 2, 1), ("c", 1, 1)],
            &[("d", 1, 1), ("e", 1, 1)],
        ]);
        let placement = place(&grid).expect("grid should place");

        assert_eq!(placement.anchors, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)]);
        assert_eq!(placement.slots[1], vec![Some(3), Some(1), Some(4)]);
    }

    #[test]
    fn rejects_row_span_past_last_row() {
        let grid = grid_of(&[&[("a", 3, 1), ("b", 1, 1)], &[("c", 1, 1)]]);
        let error = transpose(&grid).expect_err("dangling span should not transpose");

        assert!(matches!(error, TableError::SpanOverflow { row: 0, col: 0, .. }));
    }

    #[test]
    fn rejects_row_span_at_usize_limit() {
        let grid = grid_of(&[
            &[("a", 1, 1), ("b", 1, 1)],
            &[("c", usize::MAX, 1), ("d", 1, 1)],
        ]);
        let error = transpose(&grid).expect_err("huge span should not transpose");

        assert!(matches!(error, TableError::SpanOverflow { row: 1, col: 0, .. }));
    }

    #[test]
    fn rejects_grid_wider_than_position_limit() {
        let grid = grid_of(&[&[("a", 1, usize::MAX), ("b", 1, 1)], &[("c", 1, 1)]]);
        let error = place(&grid).expect_err("huge grid should not place");

        assert!(matches!(
            error,
            TableError::GridTooLarge {
                rows: 2,
                cols: usize::MAX,
                ..
            }
        ));
    }

    #[test]
    fn rejects_extra_cells_past_width() {
        let grid = grid_of(&[&[("a", 1, 1)], &[("b", 1, 1), ("c", 1, 1)]]);
        let error = transpose(&grid).expect_err("extra cell should not transpose");

        assert!(matches!(error, TableError::SpanOverflow { row: 1, col: 1, .. }));
    }

    #[test]
    fn rejects_overlapping_spans() {
        let grid = grid_of(&[
            &[("a", 1, 1), ("b", 2, 1), ("c", 1, 1)],
            &[("d", 1, 2), ("e", 1, 1)],
        ]);
        let error = transpose(&grid).expect_err("overlap should not transpose");

        assert!(matches!(error, TableError::SpanOverlap { row: 1, col: 1 }));
    }
}
