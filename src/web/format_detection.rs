use crate::parsing::TableFormat;

/// Errors that can occur during format detection
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Unable to detect table format from content and filename")]
    UnknownFormat,
    #[error("File appears to be binary but is not a recognized workbook")]
    UnsupportedBinary,
}

/// Detect the table format of an upload from its filename and content.
///
/// A recognized extension wins. Without one, workbooks are recognized by
/// their zip/OLE2 signature and text is read as TSV when its first line
/// contains a tab, CSV otherwise.
///
/// # Errors
///
/// Returns `FormatError::UnknownFormat` for empty content, or
/// `FormatError::UnsupportedBinary` for binary content that is not a
/// workbook.
pub fn detect_format(content: &[u8], filename: Option<&str>) -> Result<TableFormat, FormatError> {
    if let Some(format) = filename.and_then(TableFormat::from_filename) {
        return Ok(format);
    }

    detect_format_from_content(content)
}

fn detect_format_from_content(content: &[u8]) -> Result<TableFormat, FormatError> {
    if content.is_empty() {
        return Err(FormatError::UnknownFormat);
    }

    if is_workbook(content) {
        return Ok(TableFormat::Workbook);
    }

    let text = std::str::from_utf8(content).map_err(|_| FormatError::UnsupportedBinary)?;
    if text.trim().is_empty() {
        return Err(FormatError::UnknownFormat);
    }

    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(FormatError::UnsupportedBinary);
    }

    let first_line = text.lines().next().unwrap_or_default();
    if first_line.contains('\t') {
        Ok(TableFormat::Tsv)
    } else {
        Ok(TableFormat::Csv)
    }
}

/// Zip (xlsx, xlsm, xlsb, ods) or OLE2 (xls) signature
fn is_workbook(content: &[u8]) -> bool {
    content.starts_with(b"PK\x03\x04") || content.starts_with(&[0xD0, 0xCF, 0x11, 0xE0])
}
