use crate::model::MergedOutput;
use crate::options::MergedFill;
use crate::sheet::SheetLayout;

pub(crate) fn merge_sheets(sheets: &[SheetLayout], fill: MergedFill) -> MergedOutput {
    let width = sheets.iter().map(|sheet| sheet.cols).max().unwrap_or(0);

    let mut headers = vec!["table_id".to_string(), "orientation".to_string()];
    headers.extend((1..=width).map(|index| format!("col_{index}")));

    let mut rows = Vec::new();
    for sheet in sheets {
        for mut data_row in sheet.to_rows(fill) {
            data_row.resize(width, String::new());
            let mut row = Vec::with_capacity(width + 2);
            row.push(sheet.table_id.to_string());
            row.push(sheet.orientation.to_string());
            row.extend(data_row);
            rows.push(row);
        }
    }

    MergedOutput {
        headers,
        row_count: rows.len(),
        table_count: sheets.len(),
        rows,
    }
}
