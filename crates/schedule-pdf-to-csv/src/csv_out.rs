use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::ExtractError;
use crate::model::ScheduleTable;

fn check_widths(table: &ScheduleTable) -> Result<(), ExtractError> {
    let expected = table.width();
    match table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
    {
        Some((row, cells)) => Err(ExtractError::MalformedRow {
            row,
            expected,
            found: cells.len(),
        }),
        None => Ok(()),
    }
}

fn write_rows<W: Write>(
    writer: W,
    table: &ScheduleTable,
    delimiter: u8,
) -> Result<W, ExtractError> {
    check_widths(table)?;

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(false)
        .from_writer(writer);
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))
}

/// Serializes `table` as CSV text.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedRow`] for the first row whose width
/// differs from the header row; nothing is written in that case.
pub fn write_csv_to_string(table: &ScheduleTable, delimiter: u8) -> Result<String, ExtractError> {
    let bytes = write_rows(Vec::<u8>::new(), table, delimiter)?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

/// Serializes `table` as CSV into the file at `path`.
///
/// # Errors
///
/// Same as [`write_csv_to_string`], plus I/O failures.
pub fn write_csv(path: &Path, table: &ScheduleTable, delimiter: u8) -> Result<(), ExtractError> {
    check_widths(table)?;
    let file = std::fs::File::create(path)?;
    write_rows(file, table, delimiter)?;
    Ok(())
}

/// Parses CSV text back into records, header row included.
///
/// # Errors
///
/// Returns [`ExtractError::Csv`] for unreadable input, including records
/// whose width differs from the first one.
pub fn read_csv_records(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(false)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }
    Ok(records)
}
