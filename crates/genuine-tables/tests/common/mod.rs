use std::path::Path;

/// Wraps table markup in a minimal page and writes it to `path`.
pub fn create_test_html<T: AsRef<str>>(path: &Path, tables: &[T]) -> std::io::Result<()> {
    let mut page = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head><body>\n");
    for table in tables {
        page.push_str(table.as_ref());
        page.push('\n');
    }
    page.push_str("</body></html>\n");
    std::fs::write(path, page)
}

/// Builds `<table>` markup from rows of ready-made cell markup.
pub fn table(rows: &[&[&str]]) -> String {
    let mut markup = String::from("<table>");
    for row in rows {
        markup.push_str("<tr>");
        for cell in *row {
            markup.push_str(cell);
        }
        markup.push_str("</tr>");
    }
    markup.push_str("</table>");
    markup
}
