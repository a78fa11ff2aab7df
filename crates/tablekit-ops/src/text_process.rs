use regex::Regex;
use serde_json::Value;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "text_process";

/// `text_process`: a list of per-column string operations
/// `{column, operation ∈ {trim, lower, upper, replace, extract}, pattern?,
/// replacement?}`. `replace`'s `pattern` is a regular expression;
/// `extract` captures the pattern's first capture group into a new
/// `<col>_extracted` column, leaving the source column untouched.
pub fn text_process(config: &Value, input: &Table) -> TableResult<Table> {
    let mut table = input.clone();
    let operations = config
        .get("operations")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for op_spec in operations {
        let column = op_spec
            .get("column")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: operation missing 'column'")))?;
        let operation = op_spec
            .get("operation")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: operation missing 'operation'")))?;
        let idx = table
            .col_index(column)
            .ok_or_else(|| table.missing_column_error(OP, column))?;

        match operation {
            "trim" => apply_in_place(&mut table, idx, |s| s.trim().to_string()),
            "lower" => apply_in_place(&mut table, idx, |s| s.to_lowercase()),
            "upper" => apply_in_place(&mut table, idx, |s| s.to_uppercase()),
            "replace" => {
                let pattern = require_pattern(&op_spec)?;
                let replacement = op_spec
                    .get("replacement")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let re = Regex::new(&pattern)
                    .map_err(|e| TableError::config(format!("{OP}: invalid pattern: {e}")))?;
                apply_in_place(&mut table, idx, |s| re.replace_all(s, replacement).into_owned());
            }
            "extract" => {
                let pattern = require_pattern(&op_spec)?;
                let re = Regex::new(&pattern)
                    .map_err(|e| TableError::config(format!("{OP}: invalid pattern: {e}")))?;
                let extracted: Vec<Cell> = table
                    .rows
                    .iter()
                    .map(|row| extract_cell(&row[idx], &re))
                    .collect();
                let new_col = format!("{column}_extracted");
                if let Some(existing) = table.col_index(&new_col) {
                    for (row, value) in table.rows.iter_mut().zip(extracted) {
                        row[existing] = value;
                    }
                } else {
                    table.columns.push(new_col);
                    for (row, value) in table.rows.iter_mut().zip(extracted) {
                        row.push(value);
                    }
                }
            }
            other => {
                return Err(TableError::config(format!(
                    "{OP}: unknown operation '{other}'"
                )));
            }
        }
    }

    Ok(table)
}

fn require_pattern(op_spec: &Value) -> TableResult<String> {
    op_spec
        .get("pattern")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TableError::config(format!("{OP}: operation missing 'pattern'")))
}

fn apply_in_place(table: &mut Table, idx: usize, f: impl Fn(&str) -> String) {
    for row in table.rows.iter_mut() {
        if let Cell::Text(s) = &row[idx] {
            row[idx] = Cell::Text(f(s));
        } else if !row[idx].is_null() {
            row[idx] = Cell::Text(f(&row[idx].to_string()));
        }
    }
}

fn extract_cell(cell: &Cell, re: &Regex) -> Cell {
    if cell.is_null() {
        return Cell::Null;
    }
    let text = cell.to_string();
    re.captures(&text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| Cell::Text(m.as_str().to_string()))
        .unwrap_or(Cell::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_and_lowercases() {
        let table = Table::new(
            vec!["name".into()],
            vec![vec![Cell::Text("  Bob  ".into())]],
        )
        .unwrap();
        let config = json!({"operations": [
            {"column": "name", "operation": "trim"},
            {"column": "name", "operation": "lower"},
        ]});
        let out = text_process(&config, &table).unwrap();
        assert_eq!(out.rows[0][0], Cell::Text("bob".into()));
    }

    #[test]
    fn extract_adds_new_column() {
        let table = Table::new(
            vec!["id".into()],
            vec![vec![Cell::Text("INV-2024-001".into())]],
        )
        .unwrap();
        let config = json!({"operations": [
            {"column": "id", "operation": "extract", "pattern": r"(\d{4})"},
        ]});
        let out = text_process(&config, &table).unwrap();
        assert_eq!(out.columns, vec!["id", "id_extracted"]);
        assert_eq!(out.rows[0][1], Cell::Text("2024".into()));
    }
}
