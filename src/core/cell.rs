use serde::{Deserialize, Serialize};

/// A single raw cell read from an input table.
///
/// Spreadsheets and delimited files hand us values of mixed types. Rather than
/// coercing them implicitly, every cell is one of these variants and
/// [`CellValue::to_comparable_text`] defines exactly how it becomes text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Textual cell content
    Text(String),
    /// Numeric cell content (integers are stored as whole floats)
    Number(f64),
    /// Empty or absent cell
    Missing,
    /// Any other cell type, captured as its display string at load time
    /// (booleans, dates, spreadsheet error values)
    Other(String),
}

impl CellValue {
    /// Build a text cell, treating the empty string as [`CellValue::Missing`].
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Missing
        } else {
            Self::Text(s)
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Render the cell as text for comparison and display.
    ///
    /// | Variant | Result |
    /// |---------|--------|
    /// | `Text(s)` | `s` unchanged |
    /// | `Number(n)` | `"3"` for `3.0`, `"2.5"` for `2.5`, `"NaN"`/`"inf"`/`"-inf"` |
    /// | `Missing` | `""` |
    /// | `Other(s)` | `s` |
    ///
    /// Never fails.
    #[must_use]
    pub fn to_comparable_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Other(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Missing => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        #[allow(clippy::cast_precision_loss)] // Cell integers are far below 2^53
        Self::Number(n as f64)
    }
}

/// Largest magnitude printed as a plain integer; beyond this `f64` loses
/// integer precision and the float display is used instead.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        #[allow(clippy::cast_possible_truncation)] // Bounded by MAX_EXACT_INTEGER
        let int = n as i64;
        int.to_string()
    } else {
        n.to_string()
    }
}
