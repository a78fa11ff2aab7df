use crate::cell::Cell;
use crate::error::{TableError, TableResult};
use std::collections::HashSet;

/// An in-memory tabular value: ordered named columns, row-major cells,
/// uniform row count across columns. Column-name uniqueness is an
/// invariant enforced at construction and re-checked by any operator that
/// could introduce a collision (join, vlookup, rename, concat).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table, failing if row widths disagree with the header or
    /// if any column name repeats.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> TableResult<Self> {
        let table = Self { columns, rows };
        table.check_invariants()?;
        Ok(table)
    }

    /// Builds a table trusting the caller (used internally by operators
    /// that have just computed `columns`/`rows` together and know they
    /// agree). Still worth calling `check_invariants` before handing the
    /// result back to the runner.
    pub fn new_unchecked(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn check_invariants(&self) -> TableResult<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for name in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::compute(format!(
                    "duplicate column name '{name}' in result table"
                )));
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(TableError::compute(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.col_index(name).is_some()
    }

    /// `TableError::schema` with this table's columns as the "available"
    /// list — the common case every operator hits when a config-named
    /// column is missing.
    pub fn missing_column_error(&self, operator: &'static str, column: &str) -> TableError {
        TableError::schema(operator, column, &self.columns)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.col_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// True if every non-null cell in the column coerces to a number.
    /// Used by `fill_na`'s `mean`/`median` strategies, which apply only to
    /// numeric columns.
    pub fn column_is_numeric(&self, name: &str) -> bool {
        match self.col_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .map(|r| &r[idx])
                .filter(|c| !c.is_null())
                .all(|c| c.as_f64().is_some()),
            None => false,
        }
    }

    /// Deterministic suffixing used by join/vlookup when a non-key column
    /// name collides with one already in the result.
    pub fn unique_suffixed_name(existing: &[String], candidate: &str) -> String {
        if !existing.iter().any(|c| c == candidate) {
            return candidate.to_string();
        }
        let mut n = 2;
        loop {
            let next = format!("{candidate}_{n}");
            if !existing.iter().any(|c| c == &next) {
                return next;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_column_names() {
        let err = Table::new(
            vec!["a".into(), "a".into()],
            vec![vec![Cell::Int(1), Cell::Int(2)]],
        )
        .unwrap_err();
        assert!(err.message.contains("duplicate column"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(vec!["a".into()], vec![vec![Cell::Int(1), Cell::Int(2)]]).unwrap_err();
        assert!(err.message.contains("2 cells"));
    }

    #[test]
    fn unique_suffixed_name_increments() {
        let existing = vec!["amt".to_string(), "amt_2".to_string()];
        assert_eq!(Table::unique_suffixed_name(&existing, "amt"), "amt_3");
        assert_eq!(Table::unique_suffixed_name(&existing, "other"), "other");
    }
}
