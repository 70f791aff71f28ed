use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};

use crate::core::cell::CellValue;
use crate::core::table::RecordTable;
use crate::parsing::{unnamed_column, ParseError, TableOptions};
use crate::utils::validation::check_row_limit;

/// Parse one sheet of a workbook file (xlsx, xlsm, xlsb, xls, ods)
///
/// # Errors
///
/// Returns `ParseError::Workbook` if the file cannot be opened or read,
/// `ParseError::SheetNotFound` if the requested sheet does not exist, or
/// other parse errors if the sheet content is invalid.
pub fn parse_workbook_file(path: &Path, options: &TableOptions) -> Result<RecordTable, ParseError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ParseError::Workbook(e.to_string()))?;
    let table = read_sheet(&mut workbook, options)?;
    Ok(table.with_source(path.display().to_string()))
}

/// Parse one sheet of an in-memory workbook
///
/// # Errors
///
/// Same as [`parse_workbook_file`].
pub fn parse_workbook_bytes(bytes: &[u8], options: &TableOptions) -> Result<RecordTable, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::Workbook(e.to_string()))?;
    read_sheet(&mut workbook, options)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    options: &TableOptions,
) -> Result<RecordTable, ParseError> {
    let sheet_names = workbook.sheet_names();

    let sheet = match &options.sheet {
        Some(name) if sheet_names.contains(name) => name.clone(),
        Some(name) => {
            return Err(ParseError::SheetNotFound {
                sheet: name.clone(),
                available: sheet_names.join(", "),
            })
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ParseError::InvalidFormat("Workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    tracing::debug!(sheet = %sheet, "Reading worksheet");
    range_to_table(&range, options.header_row)
}

/// Convert a sheet range into a table.
///
/// `header_row` counts from the first row of the used range, so leading
/// empty rows of the sheet are not counted.
fn range_to_table(range: &Range<Data>, header_row: usize) -> Result<RecordTable, ParseError> {
    let mut rows_iter = range.rows().skip(header_row);

    let header = rows_iter
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("No header row found".to_string()))?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_value(cell) {
            CellValue::Missing => unnamed_column(i),
            value => value.to_comparable_text(),
        })
        .collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }
        rows.push(row.iter().map(cell_value).collect());
    }

    Ok(RecordTable::new(columns, rows))
}

/// Map a calamine cell onto a [`CellValue`]
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::from(*i),
        Data::Empty => CellValue::Missing,
        other => CellValue::Other(other.to_string()),
    }
}
