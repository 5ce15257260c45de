//! Header orientation classification.
//!
//! A table is genuine when one of four derived views of its grid reconciles.
//! Views are tried in the fixed order top, left, right, bottom and the first
//! that passes names the side the header sits on.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::TableError;
use crate::grid::Grid;
use crate::options::OrientationSet;
use crate::reconcile::reconcile;
use crate::shape::{ShapeRules, TagShape};
use crate::transform::{flip, transpose};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Top,
    Left,
    Right,
    Bottom,
    /// Layout table: no view reconciles.
    NotGenuine,
}

impl Orientation {
    /// Header orientations in check order.
    pub const CANDIDATES: [Self; 4] = [Self::Top, Self::Left, Self::Right, Self::Bottom];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::NotGenuine => "not",
        }
    }

    #[must_use]
    pub const fn is_genuine(self) -> bool {
        !matches!(self, Self::NotGenuine)
    }

    /// The view of `grid` in which a header on this side becomes the first
    /// row. `NotGenuine` returns the grid as is.
    ///
    /// # Errors
    ///
    /// Propagates transpose failures for grids whose spans do not fit.
    pub fn derive<P: Clone>(self, grid: &Grid<P>) -> Result<Grid<P>, TableError> {
        match self {
            Self::Top | Self::NotGenuine => Ok(grid.clone()),
            Self::Left => transpose(grid),
            Self::Right => transpose(&flip(grid)),
            Self::Bottom => transpose(&flip(&transpose(grid)?)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "not" | "none" => Ok(Self::NotGenuine),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

/// A genuine table: the winning orientation and the derived grid that
/// reconciled under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<P> {
    pub orientation: Orientation,
    pub grid: Grid<P>,
}

/// Classifies with every orientation enabled and the default shape rules.
#[must_use]
pub fn classify<P>(grid: &Grid<P>) -> Orientation
where
    P: TagShape + Clone,
{
    classify_with(grid, &OrientationSet::default(), &ShapeRules::default())
        .map_or(Orientation::NotGenuine, |classified| classified.orientation)
}

/// Returns the first enabled orientation whose view reconciles, or `None` for
/// a layout table. Grids with fewer than two rows are never genuine.
#[must_use]
pub fn classify_with<P>(
    grid: &Grid<P>,
    orientations: &OrientationSet,
    rules: &ShapeRules,
) -> Option<Classified<P>>
where
    P: TagShape + Clone,
{
    if grid.row_count() < 2 {
        debug!(rows = grid.row_count(), "too few rows for a header");
        return None;
    }

    for orientation in orientations.iter() {
        match orientation.derive(grid) {
            Ok(view) if reconcile(&view, rules) => {
                debug!(%orientation, "spans reconcile");
                return Some(Classified {
                    orientation,
                    grid: view,
                });
            }
            Ok(_) => debug!(%orientation, "spans do not reconcile"),
            Err(error) => debug!(%orientation, %error, "no derived view"),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Orientation, classify, classify_with};
    use crate::document::{build_grid, find_tables, parse_document};
    use crate::grid::grid_of;
    use crate::options::OrientationSet;
    use crate::reconcile::reconcile;
    use crate::shape::ShapeRules;

    fn orientation_of(html: &str) -> Orientation {
        let document = parse_document(html);
        let tables = find_tables(&document);
        let grid = build_grid(tables[0]).expect("grid should build");
        classify(&grid)
    }

    #[test]
    fn simple_table_has_top_header() {
        let html = "<table>\
            <tr><th>Name</th><th>Qty</th></tr>\
            <tr><td>apple</td><td>3</td></tr>\
            <tr><td>pear</td><td>5</td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::Top);
    }

    #[test]
    fn hierarchical_header_is_top() {
        let html = "<table>\
            <tr><th colspan='2'>Fruit</th></tr>\
            <tr><th>Name</th><th>Qty</th></tr>\
            <tr><td>apple</td><td>3</td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::Top);
    }

    #[test]
    fn single_row_is_not_genuine() {
        let html = "<table><tr><td>a</td><td>b</td></tr></table>";
        assert_eq!(orientation_of(html), Orientation::NotGenuine);
    }

    #[test]
    fn inconsistent_row_lengths_are_not_genuine() {
        let html = "<table>\
            <tr><td>a</td><td>b</td></tr>\
            <tr><td>c</td><td>d</td><td>e</td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::NotGenuine);
    }

    #[test]
    fn wide_cell_under_narrow_slots_is_left() {
        let html = "<table>\
            <tr><td>a</td><td>b</td></tr>\
            <tr><td colspan='2'>c</td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::Left);
    }

    #[test]
    fn header_on_the_right_is_found_after_left() {
        let html = "<table>\
            <tr><td>1</td><td>2</td><td>3</td><td><b>x</b></td></tr>\
            <tr><td>4</td><td>5</td><td>6</td><td><b>y</b></td></tr>\
            <tr><td colspan='2'>7</td><td>8</td><td><b>z</b></td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::Right);
    }

    #[test]
    fn classification_is_idempotent() {
        let html = "<table>\
            <tr><th rowspan='2'>k</th><th>v</th></tr>\
            <tr><td>1</td></tr>\
            </table>";
        let document = parse_document(html);
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");
        let before = grid.clone();

        let first = classify(&grid);
        assert_eq!(classify(&grid), first);
        assert_eq!(grid, before);
    }

    #[test]
    fn bottom_view_reverses_rows_of_span_free_grid() {
        let grid = grid_of(&[
            &[("a", 1, 1), ("b", 1, 1)],
            &[("c", 1, 1), ("d", 1, 1)],
            &[("e", 1, 1), ("f", 1, 1)],
        ]);
        let view = Orientation::Bottom.derive(&grid).expect("view should derive");

        assert_eq!(
            view.payloads(),
            vec![vec!["e", "f"], vec!["c", "d"], vec!["a", "b"]]
        );
    }

    #[test]
    fn left_and_right_views_are_transposes() {
        let grid = grid_of(&[&[("a", 1, 1), ("b", 1, 1)], &[("c", 1, 1), ("d", 1, 1)]]);

        let left = Orientation::Left.derive(&grid).expect("left view");
        let right = Orientation::Right.derive(&grid).expect("right view");

        assert_eq!(left.payloads(), vec![vec!["a", "c"], vec!["b", "d"]]);
        assert_eq!(right.payloads(), vec![vec!["b", "d"], vec!["a", "c"]]);
    }

    #[test]
    fn disabled_orientations_are_skipped() {
        let html = "<table>\
            <tr><td>a</td><td>b</td></tr>\
            <tr><td colspan='2'>c</td></tr>\
            </table>";
        let document = parse_document(html);
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        let top_only: OrientationSet = "top".parse().expect("set should parse");
        assert!(classify_with(&grid, &top_only, &ShapeRules::default()).is_none());

        let classified = classify_with(&grid, &OrientationSet::default(), &ShapeRules::default())
            .expect("left view should reconcile");
        assert_eq!(classified.orientation, Orientation::Left);
        assert_eq!(classified.grid.row_count(), 2);
    }

    #[test]
    fn top_view_is_the_source_grid() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";
        let document = parse_document(html);
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        let classified = classify_with(&grid, &OrientationSet::default(), &ShapeRules::default())
            .expect("plain grid should be genuine");
        assert_eq!(classified.orientation, Orientation::Top);
        assert_eq!(classified.grid, grid);
    }

    #[test]
    fn bold_cell_under_plain_cell_breaks_top_header() {
        let html = "<table>\
            <tr><th>a</th><th>b</th></tr>\
            <tr><td>1</td><td>2</td></tr>\
            <tr><td><b>3</b></td><td>4</td></tr>\
            </table>";
        let document = parse_document(html);
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        assert!(!reconcile(&grid, &ShapeRules::default()));
        assert_eq!(classify(&grid), Orientation::Left);
    }

    #[test]
    fn transparent_wrapper_keeps_top_header() {
        let html = "<table>\
            <tr><th>a</th><th>b</th></tr>\
            <tr><td>1</td><td>2</td></tr>\
            <tr><td><span>3</span></td><td>4</td></tr>\
            </table>";
        assert_eq!(orientation_of(html), Orientation::Top);
    }

    #[test]
    fn orientation_names_round_trip() {
        for orientation in Orientation::CANDIDATES {
            assert_eq!(orientation.as_str().parse(), Ok(orientation));
        }
        assert_eq!("None".parse(), Ok(Orientation::NotGenuine));
        assert!("up".parse::<Orientation>().is_err());
    }
}
