use genuine_tables::{ExtractWarning, MergedRegion, SheetLayout};
use serde::{Deserialize, Serialize};

pub const TABLES_CACHE_KEY_PREFIX: &str = "tables:page:v1:";
pub const TABLES_CACHE_TTL_SECONDS: u32 = 6 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionView {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub value: String,
}

impl From<&MergedRegion> for RegionView {
    fn from(region: &MergedRegion) -> Self {
        Self {
            row: region.row,
            col: region.col,
            row_span: region.row_span,
            col_span: region.col_span,
            value: region.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableView {
    pub table_id: usize,
    pub orientation: String,
    pub sheet_name: String,
    pub rows: usize,
    pub cols: usize,
    pub regions: Vec<RegionView>,
}

impl From<&SheetLayout> for TableView {
    fn from(sheet: &SheetLayout) -> Self {
        Self {
            table_id: sheet.table_id,
            orientation: sheet.orientation.to_string(),
            sheet_name: sheet.name.clone(),
            rows: sheet.rows,
            cols: sheet.cols,
            regions: sheet.regions.iter().map(RegionView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedTable {
    pub table_id: Option<usize>,
    pub code: String,
    pub message: String,
}

impl From<&ExtractWarning> for SkippedTable {
    fn from(warning: &ExtractWarning) -> Self {
        Self {
            table_id: warning.table_id,
            code: warning.code.as_str().to_string(),
            message: warning.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablesResponse {
    pub source_url: String,
    pub generated_at: String,
    pub orientations: String,
    pub tables: Vec<TableView>,
    pub skipped: Vec<SkippedTable>,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
