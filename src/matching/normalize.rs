//! Text normalization and tokenization for comparison keys.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::core::cell::CellValue;

/// Characters that separate tokens: ASCII space, ideographic (full-width)
/// space and forward slash.
pub const TOKEN_SEPARATORS: [char; 3] = [' ', '\u{3000}', '/'];

/// A folded string used only for scoring, never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey(String);

impl ComparisonKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token set of this key
    #[must_use]
    pub fn tokens(&self) -> HashSet<&str> {
        tokenize(&self.0)
    }
}

impl AsRef<str> for ComparisonKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Apply NFKC width/compatibility normalization to text cells.
///
/// Full-width digits and letters, half-width katakana and other compatibility
/// forms collapse to one canonical form. Non-text cells are returned unchanged.
#[must_use]
pub fn normalize_width(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => CellValue::Text(s.nfkc().collect()),
        other => other.clone(),
    }
}

/// Fold a cell into its comparison key: render as text, then upper-case.
///
/// Whitespace and separators are kept; the token signal depends on them.
#[must_use]
pub fn fold(value: &CellValue) -> ComparisonKey {
    fold_str(&value.to_comparable_text())
}

/// [`fold`] for text that is already a string
#[must_use]
pub fn fold_str(s: &str) -> ComparisonKey {
    ComparisonKey(s.to_uppercase())
}

/// Split a key into its set of non-empty tokens.
#[must_use]
pub fn tokenize(s: &str) -> HashSet<&str> {
    s.split(|c: char| TOKEN_SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_width_full_width_digits() {
        let cell = CellValue::from("ABC１２３");
        assert_eq!(normalize_width(&cell), CellValue::from("ABC123"));
    }

    #[test]
    fn test_normalize_width_half_width_katakana() {
        let cell = CellValue::from("ｿﾆｰ");
        assert_eq!(normalize_width(&cell), CellValue::from("ソニー"));
    }

    #[test]
    fn test_normalize_width_ideographic_space_becomes_ascii() {
        let cell = CellValue::from("商品\u{3000}A");
        assert_eq!(normalize_width(&cell), CellValue::from("商品 A"));
    }

    #[test]
    fn test_normalize_width_non_text_unchanged() {
        assert_eq!(normalize_width(&CellValue::Number(1.5)), CellValue::Number(1.5));
        assert_eq!(normalize_width(&CellValue::Missing), CellValue::Missing);
    }

    #[test]
    fn test_fold_uppercases_without_trimming() {
        let key = fold(&CellValue::from("  sony product/a "));
        assert_eq!(key.as_str(), "  SONY PRODUCT/A ");
    }

    #[test]
    fn test_fold_is_idempotent() {
        let once = fold(&CellValue::from("Straße ｱ abc"));
        let twice = fold_str(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fold_coerces_non_text() {
        assert_eq!(fold(&CellValue::Number(12.0)).as_str(), "12");
        assert_eq!(fold(&CellValue::Missing).as_str(), "");
        assert_eq!(fold(&CellValue::Other("true".into())).as_str(), "TRUE");
    }

    #[test]
    fn test_tokenize_separators() {
        let tokens = tokenize("SONY PRODUCT/A\u{3000}B");
        let expected: HashSet<&str> = ["SONY", "PRODUCT", "A", "B"].into_iter().collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_tokenize_collapses_duplicates_and_empties() {
        let tokens = tokenize("A  A//B");
        let expected: HashSet<&str> = ["A", "B"].into_iter().collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_tokenize_edge_cases() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \u{3000}/ ").is_empty());
        let single: HashSet<&str> = ["SONY"].into_iter().collect();
        assert_eq!(tokenize("SONY"), single);
        // Tabs are not separators
        assert_eq!(tokenize("A\tB").len(), 1);
    }
}
