//! Loaders that turn input files into [`RecordTable`]s.
//!
//! This module provides parsers for:
//!
//! - **Workbooks** (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`): one sheet, read with calamine
//! - **CSV files**: comma-separated, header row first
//! - **TSV files** (`.tsv`, `.tab`, `.txt`): tab-separated, header row first
//!
//! ## Example
//!
//! ```rust,no_run
//! use name_reconciler::parsing::{load_table, TableOptions};
//! use std::path::Path;
//!
//! let options = TableOptions::default().with_sheet("Sheet1");
//! let table = load_table(Path::new("yuragi.xlsx"), &options).unwrap();
//! println!("{} rows, columns: {:?}", table.len(), table.columns);
//! ```
//!
//! ## Cell Mapping
//!
//! | Source cell | [`CellValue`](crate::core::cell::CellValue) |
//! |-------------|-----------|
//! | non-empty string | `Text` |
//! | empty string, empty cell | `Missing` |
//! | integer, float | `Number` |
//! | bool, date, duration, error | `Other` (display string) |
//!
//! Delimited files are untyped, so every non-empty field is `Text`.

use std::path::Path;

use crate::core::table::RecordTable;

pub mod delimited;
pub mod workbook;

/// Errors raised while loading an input table
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Too many rows: {0} exceeds maximum allowed")]
    TooManyRows(usize),
}

/// Supported input table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    /// Spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods)
    Workbook,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

impl TableFormat {
    /// Get the display name for this format
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Workbook => "Spreadsheet Workbook",
            Self::Csv => "CSV Table",
            Self::Tsv => "TSV Table",
        }
    }

    /// Detect the format from a file name's extension
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            "tsv" | "tab" | "txt" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Field delimiter for delimited formats
    #[must_use]
    pub fn delimiter(self) -> Option<u8> {
        match self {
            Self::Workbook => None,
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
        }
    }
}

/// How to read a table out of an input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Worksheet to read; the first sheet when `None`. Ignored for delimited files.
    pub sheet: Option<String>,
    /// 0-based index of the header row; rows above it are skipped
    pub header_row: usize,
    /// Force a format instead of detecting it from the extension
    pub format: Option<TableFormat>,
}

impl TableOptions {
    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    #[must_use]
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TableFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Load a table from a file, choosing the parser from the extension.
///
/// # Errors
///
/// Returns `ParseError::UnsupportedFormat` if the format cannot be determined,
/// or the error of the underlying parser.
pub fn load_table(path: &Path, options: &TableOptions) -> Result<RecordTable, ParseError> {
    let format = options
        .format
        .or_else(|| path.to_str().and_then(TableFormat::from_filename))
        .ok_or_else(|| ParseError::UnsupportedFormat(path.display().to_string()))?;

    let table = match format.delimiter() {
        None => workbook::parse_workbook_file(path, options)?,
        Some(delimiter) => delimited::parse_delimited_file(path, delimiter, options.header_row)?,
    };

    tracing::info!(
        "Loaded {} ({} rows, {})",
        path.display(),
        table.len(),
        format.display_name()
    );

    Ok(table)
}

/// Parse an in-memory table of a known format (used for uploads).
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if delimited content is not UTF-8, or
/// the error of the underlying parser.
pub fn parse_table_bytes(
    bytes: &[u8],
    format: TableFormat,
    options: &TableOptions,
) -> Result<RecordTable, ParseError> {
    match format.delimiter() {
        None => workbook::parse_workbook_bytes(bytes, options),
        Some(delimiter) => {
            let text = std::str::from_utf8(bytes).map_err(|_| {
                ParseError::InvalidFormat("Delimited file is not valid UTF-8".to_string())
            })?;
            delimited::parse_delimited_text(text, delimiter, options.header_row)
        }
    }
}

/// Name for a header cell with no text, as spreadsheet tools label them
pub(crate) fn unnamed_column(index: usize) -> String {
    format!("Unnamed: {index}")
}
