//! HTML adapter: decodes page bytes, finds tables and turns their rows into
//! span-annotated grids of cell elements.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::TableError;
use crate::grid::{Cell, Grid};

const SNIFF_WINDOW: usize = 1024;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector must parse"));

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("static regex must compile")
});

#[must_use]
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Every `<table>` element in document order, inner tables included.
#[must_use]
pub fn find_tables(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&TABLE_SELECTOR).collect()
}

/// Whether another `<table>` sits anywhere below `table`.
#[must_use]
pub fn contains_nested_table(table: ElementRef<'_>) -> bool {
    table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|element| element.value().name() == "table")
}

/// Builds the grid of `table` from its own rows. Rows of nested tables are
/// not included.
///
/// # Errors
///
/// Returns [`TableError::MalformedSpan`] for a `rowspan` or `colspan` that is
/// not a positive integer. Large spans are accepted here; the dense layout
/// rejects them later with [`TableError::GridTooLarge`].
pub fn build_grid(table: ElementRef<'_>) -> Result<Grid<ElementRef<'_>>, TableError> {
    let mut rows = Vec::new();
    for (row_index, row) in own_rows(table).into_iter().enumerate() {
        let mut cells = Vec::new();
        let row_cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|element| matches!(element.value().name(), "td" | "th"));
        for (cell_index, cell) in row_cells.enumerate() {
            let row_span = read_span(cell, "rowspan", row_index, cell_index)?;
            let col_span = read_span(cell, "colspan", row_index, cell_index)?;
            cells.push(Cell::new(cell, row_span, col_span));
        }
        rows.push(cells);
    }

    Ok(Grid::from_rows(rows))
}

fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn read_span(
    cell: ElementRef<'_>,
    attribute: &'static str,
    row: usize,
    index: usize,
) -> Result<usize, TableError> {
    let Some(raw) = cell.value().attr(attribute) else {
        return Ok(1);
    };
    match raw.trim().parse::<usize>() {
        Ok(span) if span > 0 => Ok(span),
        _ => Err(TableError::MalformedSpan {
            row,
            cell: index,
            attribute,
            value: raw.to_string(),
        }),
    }
}

/// Decodes page bytes. An explicit `label` wins; otherwise a byte order mark,
/// then a `<meta>` charset near the top of the page, then UTF-8.
///
/// # Errors
///
/// Returns [`TableError::UnknownEncoding`] when `label` names no encoding.
pub fn decode_html(bytes: &[u8], label: Option<&str>) -> Result<String, TableError> {
    if let Some(label) = label {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| TableError::UnknownEncoding(label.to_string()))?;
        let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
        if had_errors {
            warn!(encoding = encoding.name(), "replaced malformed byte sequences");
        }
        return Ok(text.into_owned());
    }

    let sniffed = sniff_meta_charset(bytes).unwrap_or(UTF_8);
    let (text, used, had_errors) = sniffed.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "replaced malformed byte sequences");
    }
    Ok(text.into_owned())
}

/// Reads and decodes an HTML file.
///
/// # Errors
///
/// Fails when the file cannot be read or `label` names no encoding.
pub fn read_html(path: &Path, label: Option<&str>) -> Result<String, TableError> {
    let bytes = fs::read(path)?;
    decode_html(&bytes, label)
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let label = META_CHARSET_RE.captures(window)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{build_grid, contains_nested_table, decode_html, find_tables, parse_document};
    use crate::error::TableError;

    #[test]
    fn finds_tables_in_document_order() {
        let document = parse_document(
            "<table id='a'><tr><td><table id='b'><tr><td>x</td></tr></table></td></tr></table>\
             <table id='c'><tr><td>y</td></tr></table>",
        );
        let ids = find_tables(&document)
            .into_iter()
            .filter_map(|table| table.value().attr("id"))
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn detects_nested_tables() {
        let document = parse_document(
            "<table><tr><td><div><table><tr><td>x</td></tr></table></div></td></tr></table>",
        );
        let tables = find_tables(&document);

        assert!(contains_nested_table(tables[0]));
        assert!(!contains_nested_table(tables[1]));
    }

    #[test]
    fn reads_spans_and_section_rows() {
        let document = parse_document(
            "<table>\
             <thead><tr><th colspan='2'>h</th></tr></thead>\
             <tbody><tr><td rowspan=' 2 '>a</td><td>b</td></tr><tr><td>c</td></tr></tbody>\
             </table>",
        );
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        assert_eq!(grid.spans(), vec![vec![(1, 2)], vec![(2, 1), (1, 1)], vec![(1, 1)]]);
    }

    #[test]
    fn nested_table_rows_stay_out_of_outer_grid() {
        let document = parse_document(
            "<table><tr><td><table><tr><td>x</td><td>y</td></tr></table></td></tr></table>",
        );
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        assert_eq!(grid.spans(), vec![vec![(1, 1)]]);
    }

    #[test]
    fn large_spans_are_not_malformed() {
        let document = parse_document(
            "<table><tr><td colspan='1500'>a</td></tr><tr><td rowspan='70000'>b</td></tr></table>",
        );
        let grid = build_grid(find_tables(&document)[0]).expect("grid should build");

        assert_eq!(grid.spans(), vec![vec![(1, 1500)], vec![(70000, 1)]]);
    }

    #[test]
    fn rejects_malformed_spans() {
        for span in ["", "  ", "0", "-1", "two", "1.5"] {
            let html = format!("<table><tr><td>a</td><td colspan='{span}'>b</td></tr></table>");
            let document = parse_document(&html);
            let error = build_grid(find_tables(&document)[0]).expect_err("span should fail");

            assert!(matches!(
                error,
                TableError::MalformedSpan {
                    row: 0,
                    cell: 1,
                    attribute: "colspan",
                    ..
                }
            ));
        }
    }

    #[test]
    fn decodes_meta_charset() {
        let bytes = b"<html><head><meta charset=\"windows-1251\"></head><p>\xcf\xf0\xe8</p>";
        let text = decode_html(bytes, None).expect("page should decode");

        assert!(text.contains("\u{41f}\u{440}\u{438}"));
    }

    #[test]
    fn decodes_http_equiv_charset() {
        let bytes = b"<meta http-equiv='Content-Type' content='text/html; charset=koi8-r'>\xf0";
        let text = decode_html(bytes, None).expect("page should decode");

        assert!(text.ends_with('\u{41f}'));
    }

    #[test]
    fn explicit_label_overrides_meta() {
        let bytes = b"<meta charset=\"windows-1251\">\xc3\xa9";
        let text = decode_html(bytes, Some("utf-8")).expect("page should decode");

        assert!(text.ends_with('\u{e9}'));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let error = decode_html(b"<p></p>", Some("klingon")).expect_err("label should fail");

        assert!(matches!(error, TableError::UnknownEncoding(label) if label == "klingon"));
    }
}
