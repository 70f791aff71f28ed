//! Limits and upload checks shared by the loaders and the web server.

use crate::parsing::TableFormat;

/// Maximum number of data rows read from one table
pub const MAX_ROWS: usize = 200_000;

/// Longest accepted upload filename, in bytes
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Smallest accepted upload, in bytes
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Extensions a dot-prefixed upload name may still carry
const TABLE_EXTENSIONS: [&str; 9] = [
    ".xlsx", ".xlsm", ".xlsb", ".xls", ".ods", ".csv", ".tsv", ".tab", ".txt",
];

/// Zip local file header (xlsx, xlsm, xlsb, ods)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE2 compound document header (legacy xls)
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Share of control characters tolerated in a text upload, as 1/N of its length
const CONTROL_CHAR_DIVISOR: usize = 20;

/// Texts up to this size skip the control character ratio check
const CONTROL_CHAR_MIN_LEN: usize = 100;

/// Returns a message when a table already holding `count` rows may not take another.
///
/// Loaders call this before pushing each row.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    (count >= MAX_ROWS).then(|| format!("Row limit of {MAX_ROWS} reached"))
}

/// Why an upload was refused
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename longer than {MAX_FILENAME_LENGTH} bytes")]
    FilenameTooLong,
    #[error("Filename contains a path or characters that are not allowed")]
    InvalidFilename,
    #[error("Filename is empty")]
    EmptyFilename,
    #[error("File is empty or is not readable text")]
    InvalidFileContent,
    #[error("File content does not match its format")]
    FormatValidationFailed,
}

/// Check an upload's filename and return a cleaned copy for display.
///
/// Path separators, `..` and control characters reject the name outright.
/// Otherwise anything that is not a letter, digit, `.`, `-`, `_` or space is
/// dropped. Letters include non-ASCII scripts, so `商品マスタ.xlsx` survives
/// unchanged.
///
/// # Errors
///
/// `EmptyFilename` for a blank name, `FilenameTooLong` past
/// [`MAX_FILENAME_LENGTH`] bytes, `InvalidFilename` for everything else that
/// is refused.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    let has_path = filename.contains("..") || filename.contains(|c: char| c == '/' || c == '\\');
    if has_path || filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename);
    }

    let cleaned: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();

    if cleaned.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }
    // Dotfiles only when the whole name is a table extension, e.g. ".csv"
    if cleaned.starts_with('.') && !has_table_extension(&cleaned) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(cleaned)
}

fn has_table_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    TABLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Whether `content` looks like a file of `format`.
///
/// Workbooks need a zip or OLE2 signature, delimited tables must decode as
/// UTF-8. Empty content never matches.
#[must_use]
pub fn validate_file_format(content: &[u8], format: TableFormat) -> bool {
    if content.is_empty() {
        return false;
    }

    match format {
        TableFormat::Workbook => content.starts_with(ZIP_MAGIC) || content.starts_with(OLE_MAGIC),
        TableFormat::Csv | TableFormat::Tsv => std::str::from_utf8(content).is_ok(),
    }
}

/// Reject empty uploads and, for text, undecodable or mostly-control content.
///
/// Tabs and line breaks are not counted as control characters.
///
/// # Errors
///
/// `InvalidFileContent` when any check fails.
pub fn validate_file_content(content: &[u8], expect_text: bool) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }
    if !expect_text {
        return Ok(());
    }

    let text = std::str::from_utf8(content).map_err(|_| ValidationError::InvalidFileContent)?;
    let controls = text
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
        .count();

    if text.len() > CONTROL_CHAR_MIN_LEN && controls > text.len() / CONTROL_CHAR_DIVISOR {
        return Err(ValidationError::InvalidFileContent);
    }
    Ok(())
}

/// All upload checks in order: filename, content, then signature.
///
/// Returns the cleaned filename, if one was given.
///
/// # Errors
///
/// The first [`ValidationError`] hit.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
    format: TableFormat,
) -> Result<Option<String>, ValidationError> {
    let cleaned = filename.map(validate_filename).transpose()?;

    validate_file_content(content, format.delimiter().is_some())?;
    if !validate_file_format(content, format) {
        return Err(ValidationError::FormatValidationFailed);
    }

    Ok(cleaned)
}
