use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::TableError;
use crate::model::MergedOutput;

fn builder(delimiter: u8) -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.delimiter(delimiter).flexible(false);
    builder
}

fn write_records<W: Write>(writer: &mut Writer<W>, merged: &MergedOutput) -> Result<(), TableError> {
    writer.write_record(&merged.headers)?;
    for row in &merged.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(
    path: &Path,
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<(), TableError> {
    let mut writer = builder(delimiter).from_path(path)?;
    write_records(&mut writer, merged)
}

pub(crate) fn write_csv_to_string(
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<String, TableError> {
    let mut writer = builder(delimiter).from_writer(Vec::<u8>::new());
    write_records(&mut writer, merged)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TableError::Io(error.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|error| TableError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}
