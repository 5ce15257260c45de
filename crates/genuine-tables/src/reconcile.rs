//! Span reconciliation: the top-to-bottom sweep deciding whether a grid's
//! spans assemble into one consistent rectangular table.
//!
//! The sweep keeps a *frontier*: for every column slot of the table, the cell
//! that currently owns it. Cells whose row span is not yet used up are carried
//! into the next row unchanged. Every other slot must be filled, left to
//! right, by the next row's cells so that their column spans add up exactly
//! to the slot's width. A row cell that fills a slot on its own is *aligned*;
//! an aligned cell sitting under an aligned cell must repeat its tag shape.
//!
//! Any inconsistency makes the sweep answer `false`. Nothing here is an error:
//! most layout tables are expected to fail.

use std::cmp::Ordering;

use tracing::trace;

use crate::grid::{Cell, Grid};
use crate::shape::{ShapeRules, TagShape};

/// Returns `true` when the grid's spans reconcile row by row with the column
/// partition established by the first row.
///
/// Works on a private copy; `grid` is left untouched.
#[must_use]
pub fn reconcile<P>(grid: &Grid<P>, rules: &ShapeRules) -> bool
where
    P: TagShape + Clone,
{
    if grid.row_count() < 2 {
        return false;
    }

    let mut rows = grid.clone().into_rows().into_iter();
    let Some(mut frontier) = rows.next() else {
        return false;
    };

    for (offset, row) in rows.enumerate() {
        for cell in &mut frontier {
            cell.row_span = cell.row_span.saturating_sub(1);
        }

        match advance(frontier, row, rules) {
            Some(next) => frontier = next,
            None => {
                trace!(row = offset + 1, "row does not reconcile with frontier");
                return false;
            }
        }
    }

    frontier.iter().all(|cell| cell.row_span == 1)
}

/// Reconciles one row against the frontier and returns the next frontier.
fn advance<P>(
    frontier: Vec<Cell<P>>,
    row: Vec<Cell<P>>,
    rules: &ShapeRules,
) -> Option<Vec<Cell<P>>>
where
    P: TagShape,
{
    // A cell may not start under a running span and outlive it.
    let shortest_carry = frontier
        .iter()
        .filter(|cell| cell.is_active_carry())
        .map(|cell| cell.row_span)
        .min();

    let mut incoming = row.into_iter();
    let mut next = Vec::with_capacity(frontier.len());

    for slot in frontier {
        if slot.row_span > 0 {
            next.push(slot);
            continue;
        }

        let mut consumed: usize = 0;
        loop {
            let mut cell = incoming.next()?;
            if shortest_carry.is_some_and(|remaining| cell.row_span > remaining) {
                return None;
            }

            let filled = consumed.saturating_add(cell.col_span);
            match filled.cmp(&slot.col_span) {
                Ordering::Less => {
                    consumed = filled;
                    next.push(cell);
                }
                Ordering::Equal => {
                    if consumed == 0 {
                        cell.aligned = true;
                        if slot.aligned && !same_shape(&slot, &cell, rules) {
                            return None;
                        }
                    }
                    next.push(cell);
                    break;
                }
                Ordering::Greater => return None,
            }
        }
    }

    incoming.next().is_none().then_some(next)
}

fn same_shape<P: TagShape>(above: &Cell<P>, below: &Cell<P>, rules: &ShapeRules) -> bool {
    above.payload().tag_shape(rules) == below.payload().tag_shape(rules)
}
