//! Writers for reconciliation results.
//!
//! - [`xlsx`]: the `Match Results` workbook, to a file or an in-memory buffer

pub mod xlsx;

/// Errors raised while writing results
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Too many results for one worksheet: {0}")]
    TooManyRows(usize),
}

/// Format a score the way every printer shows it
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}
