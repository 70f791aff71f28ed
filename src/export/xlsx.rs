use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::export::ExportError;
use crate::matching::reconcile::MatchResult;

pub const RESULTS_SHEET: &str = "Match Results";

pub const RESULT_HEADERS: [&str; 5] = [
    "Original Variant",
    "Matched Reference",
    "Hybrid Score",
    "Char Similarity",
    "Token Similarity",
];

/// Excel number format for score columns
const SCORE_FORMAT: &str = "0.000";

/// Write results to an xlsx file at `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `ExportError::Xlsx` if the workbook cannot be built or saved.
pub fn write_results_xlsx(results: &[MatchResult], path: &Path) -> Result<(), ExportError> {
    let mut workbook = build_workbook(results)?;
    workbook.save(path)?;
    tracing::info!("Wrote {} result(s) to {}", results.len(), path.display());
    Ok(())
}

/// Render results as xlsx bytes
///
/// # Errors
///
/// Returns `ExportError::Xlsx` if the workbook cannot be built.
pub fn results_to_xlsx_bytes(results: &[MatchResult]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(results)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(results: &[MatchResult]) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let score_format = Format::new().set_num_format(SCORE_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(RESULTS_SHEET)?;

    for (col, header) in (0u16..).zip(RESULT_HEADERS) {
        worksheet.write_string_with_format(0, col, header, &header_format)?;
    }
    worksheet.set_column_width(0, 36)?;
    worksheet.set_column_width(1, 36)?;
    worksheet.set_column_width(2, 14)?;
    worksheet.set_column_width(3, 14)?;
    worksheet.set_column_width(4, 14)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (i, result) in results.iter().enumerate() {
        let row = u32::try_from(i + 1).map_err(|_| ExportError::TooManyRows(results.len()))?;

        worksheet.write_string(row, 0, &result.original_variant)?;

        // Absent matches leave the remaining cells blank
        if let (Some(reference), Some(score)) = (&result.matched_reference, result.score) {
            worksheet.write_string(row, 1, reference)?;
            worksheet.write_number_with_format(row, 2, score.hybrid, &score_format)?;
            worksheet.write_number_with_format(row, 3, score.char_sim, &score_format)?;
            worksheet.write_number_with_format(row, 4, score.token_sim, &score_format)?;
        }
    }

    Ok(workbook)
}
