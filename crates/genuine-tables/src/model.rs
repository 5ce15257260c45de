/// Flat rows of every genuine table under one shared header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedOutput {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub table_count: usize,
    pub row_count: usize,
}
