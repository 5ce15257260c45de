mod classify;
mod csv_out;
mod document;
mod error;
mod grid;
mod merge;
mod model;
mod options;
mod reconcile;
mod shape;
mod sheet;
mod transform;
mod warning;

use std::path::Path;

use scraper::ElementRef;
use tracing::{debug, warn};

use crate::csv_out::{write_csv, write_csv_to_string};
use crate::merge::merge_sheets;
use crate::model::MergedOutput;
use crate::warning::WarningCode;

pub use classify::{Classified, Orientation, classify, classify_with};
pub use document::{
    build_grid, contains_nested_table, decode_html, find_tables, parse_document, read_html,
};
pub use error::TableError;
pub use grid::{Cell, Grid};
pub use options::{ExtractOptions, MergedFill, OrientationSet, TableSelection};
pub use reconcile::reconcile;
pub use shape::{Shape, ShapeRules, TagShape, shape};
pub use sheet::{CellText, MergedRegion, SheetLayout};
pub use transform::{MAX_GRID_POSITIONS, flip, transpose};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Genuine(SheetLayout),
    Skipped(ExtractWarning),
}

/// Verdict for one `<table>` of the page; `table_id` is its 1-based position
/// in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table_id: usize,
    pub outcome: TableOutcome,
}

impl TableReport {
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        match &self.outcome {
            TableOutcome::Genuine(sheet) => sheet.orientation,
            TableOutcome::Skipped(_) => Orientation::NotGenuine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub tables: Vec<TableReport>,
    pub warnings: Vec<ExtractWarning>,
}

impl Classification {
    pub fn sheets(&self) -> impl Iterator<Item = &SheetLayout> {
        self.tables.iter().filter_map(|report| match &report.outcome {
            TableOutcome::Genuine(sheet) => Some(sheet),
            TableOutcome::Skipped(_) => None,
        })
    }

    #[must_use]
    pub fn genuine_count(&self) -> usize {
        self.sheets().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub table_count: usize,
    pub genuine_count: usize,
    pub row_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

fn classify_table(table: ElementRef<'_>, table_id: usize, options: &ExtractOptions) -> TableOutcome {
    if contains_nested_table(table) {
        return TableOutcome::Skipped(
            ExtractWarning::new(WarningCode::NestedTable, "table contains a nested table")
                .with_table_id(table_id),
        );
    }

    let grid = match build_grid(table) {
        Ok(grid) => grid,
        Err(error) => {
            return TableOutcome::Skipped(
                ExtractWarning::new(WarningCode::MalformedSpan, error.to_string())
                    .with_table_id(table_id),
            );
        }
    };

    let Some(classified) = classify_with(&grid, &options.orientations, &options.shape_rules)
    else {
        return TableOutcome::Skipped(
            ExtractWarning::new(
                WarningCode::NotGenuine,
                "no header orientation reconciles the cell spans",
            )
            .with_table_id(table_id),
        );
    };

    match SheetLayout::from_classified(table_id, &classified) {
        Ok(sheet) => TableOutcome::Genuine(sheet),
        Err(error) => TableOutcome::Skipped(
            ExtractWarning::new(WarningCode::Unplaceable, error.to_string())
                .with_table_id(table_id),
        ),
    }
}

/// Classifies every selected table of an HTML page.
#[must_use]
pub fn classify_html(html: &str, options: &ExtractOptions) -> Classification {
    let document = parse_document(html);
    let mut classification = Classification::default();

    for (index, table) in find_tables(&document).into_iter().enumerate() {
        let table_id = index + 1;
        if options
            .tables
            .as_ref()
            .is_some_and(|selection| !selection.contains(table_id))
        {
            continue;
        }

        let outcome = classify_table(table, table_id, options);
        match &outcome {
            TableOutcome::Genuine(sheet) => {
                debug!(table_id, orientation = %sheet.orientation, "genuine table");
            }
            TableOutcome::Skipped(warning) if warning.code == WarningCode::NotGenuine => {
                debug!(table_id, "layout table");
                classification.warnings.push(warning.clone());
            }
            TableOutcome::Skipped(warning) => {
                warn!(table_id, code = warning.code.as_str(), "{}", warning.message);
                classification.warnings.push(warning.clone());
            }
        }
        classification.tables.push(TableReport { table_id, outcome });
    }

    if classification.genuine_count() == 0 {
        classification.warnings.push(ExtractWarning::new(
            WarningCode::NoGenuineTables,
            "no genuine tables were found in the selected tables",
        ));
    }

    classification
}

fn apply_output_column_filters(merged: MergedOutput, options: &ExtractOptions) -> MergedOutput {
    if !options.no_table && !options.no_orientation {
        return merged;
    }

    let keep_indices = merged
        .headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            if options.no_table && header == "table_id" {
                return None;
            }
            if options.no_orientation && header == "orientation" {
                return None;
            }
            Some(index)
        })
        .collect::<Vec<_>>();

    let project = |row: &Vec<String>| {
        keep_indices
            .iter()
            .filter_map(|&index| row.get(index).cloned())
            .collect::<Vec<_>>()
    };

    MergedOutput {
        headers: project(&merged.headers),
        rows: merged.rows.iter().map(project).collect(),
        row_count: merged.row_count,
        table_count: merged.table_count,
    }
}

fn validate_options(options: &ExtractOptions) -> Result<(), TableError> {
    if !options.delimiter.is_ascii() || matches!(options.delimiter, b'"' | b'\n' | b'\r') {
        return Err(TableError::InvalidOption(format!(
            "delimiter {:?} cannot separate CSV fields",
            char::from(options.delimiter)
        )));
    }
    Ok(())
}

fn extract_from_html(html: &str, options: &ExtractOptions) -> (MergedOutput, ExtractionReport) {
    let classification = classify_html(html, options);
    let sheets = classification.sheets().cloned().collect::<Vec<_>>();

    let merged = merge_sheets(&sheets, options.fill);
    let merged = apply_output_column_filters(merged, options);

    let report = ExtractionReport {
        table_count: classification.tables.len(),
        genuine_count: sheets.len(),
        row_count: merged.row_count,
        warnings: classification.warnings,
    };
    (merged, report)
}

/// Reads an HTML file and writes the rows of its genuine tables as CSV. No
/// output file is created when the page has no genuine table.
///
/// # Errors
///
/// Fails on invalid options, unreadable input, an unknown encoding label or
/// a CSV write error.
pub fn extract_html_to_csv(
    input_html: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, TableError> {
    validate_options(options)?;

    let html = read_html(input_html, options.encoding.as_deref())?;
    let (merged, report) = extract_from_html(&html, options);
    if report.genuine_count > 0 {
        write_csv(output_csv, &merged, options.delimiter)?;
    }

    Ok(report)
}

/// Renders the genuine tables of `html` as CSV text. The text is empty when
/// the page has no genuine table.
///
/// # Errors
///
/// Fails on invalid options or a CSV write error.
pub fn extract_html_to_csv_string(
    html: &str,
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), TableError> {
    validate_options(options)?;

    let (merged, report) = extract_from_html(html, options);
    let csv = if report.genuine_count > 0 {
        write_csv_to_string(&merged, options.delimiter)?
    } else {
        String::new()
    };

    Ok((csv, report))
}
