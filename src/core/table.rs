use serde::{Deserialize, Serialize};

use crate::core::cell::CellValue;

/// An ordered table of records with named columns.
///
/// This is the shape every input source (workbook sheet, CSV, TSV) is loaded
/// into before reconciliation. Rows keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    /// Column names from the header row
    pub columns: Vec<String>,

    /// Data rows; a row shorter than `columns` reads missing cells as [`CellValue::Missing`]
    pub rows: Vec<Vec<CellValue>>,

    /// Where the table came from (file path or upload name), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

static MISSING: CellValue = CellValue::Missing;

impl RecordTable {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            source: None,
        }
    }

    /// Build a single-column table, mostly useful for tests and the `compare` command.
    #[must_use]
    pub fn single_column<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::new(
            vec![column.to_string()],
            values.into_iter().map(|v| vec![v.into()]).collect(),
        )
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Position of a column by exact name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate the cells of one column in row order.
    ///
    /// Returns `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&MISSING)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordTable {
        RecordTable::new(
            vec!["id".to_string(), "商品名".to_string()],
            vec![
                vec![CellValue::Number(1.0), CellValue::from("Sony Product A")],
                vec![CellValue::Number(2.0)],
            ],
        )
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column_index("商品名"), Some(1));
        assert!(table.has_column("id"));
        assert!(!table.has_column("name"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ragged_rows_read_as_missing() {
        let table = sample();
        let cells: Vec<&CellValue> = table.column("商品名").unwrap().collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], &CellValue::from("Sony Product A"));
        assert_eq!(cells[1], &CellValue::Missing);
    }

    #[test]
    fn test_unknown_column() {
        assert!(sample().column("missing").is_none());
    }

    #[test]
    fn test_single_column() {
        let table = RecordTable::single_column("name", ["A", "B"]).with_source("inline");
        assert_eq!(table.columns, vec!["name".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.source.as_deref(), Some("inline"));
    }
}
