use std::path::Path;

use crate::core::cell::CellValue;
use crate::core::table::RecordTable;
use crate::parsing::{unnamed_column, ParseError};
use crate::utils::validation::check_row_limit;

/// Parse a CSV/TSV file whose header row is at `header_row` (0-based)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_delimited_file(
    path: &Path,
    delimiter: u8,
    header_row: usize,
) -> Result<RecordTable, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_delimited_text(&content, delimiter, header_row)?;
    Ok(table.with_source(path.display().to_string()))
}

/// Parse delimited text into a table.
///
/// Rows above `header_row` are skipped, the header row names the columns, and
/// every following record becomes a row. Rows may have differing lengths.
/// Empty fields read as [`CellValue::Missing`], everything else as text.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if there is no header row,
/// `ParseError::Csv` on malformed quoting, or `ParseError::TooManyRows` if
/// the row limit is exceeded.
pub fn parse_delimited_text(
    text: &str,
    delimiter: u8,
    header_row: usize,
) -> Result<RecordTable, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records().skip(header_row);

    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| ParseError::InvalidFormat("No header row found".to_string()))?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                unnamed_column(i)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;

        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }

        rows.push(record.iter().map(CellValue::text).collect());
    }

    Ok(RecordTable::new(columns, rows))
}
