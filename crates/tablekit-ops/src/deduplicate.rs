use crate::config::opt_str_list;
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "deduplicate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    First,
    Last,
    None,
}

impl Keep {
    /// Canonicalizes the config value; the literal string `"false"` is
    /// accepted as a legacy alias for `None` (DESIGN NOTES open question b).
    fn parse(raw: &str) -> TableResult<Self> {
        match raw {
            "first" => Ok(Keep::First),
            "last" => Ok(Keep::Last),
            "none" | "false" => Ok(Keep::None),
            other => Err(TableError::config(format!(
                "{OP}: unknown keep value '{other}'"
            ))),
        }
    }
}

/// `deduplicate`: drops duplicate rows by `subset` (default: all
/// columns), keeping `{first, last, none}`.
pub fn deduplicate(config: &Value, input: &Table) -> TableResult<Table> {
    let keep = match config.get("keep") {
        Some(Value::String(s)) => Keep::parse(s)?,
        Some(Value::Bool(false)) => Keep::None,
        None => Keep::First,
        Some(other) => {
            return Err(TableError::config(format!(
                "{OP}: unsupported keep value {other}"
            )));
        }
    };

    let subset = opt_str_list(config, &["subset"]).unwrap_or_else(|| input.columns.clone());
    let mut indices = Vec::with_capacity(subset.len());
    for name in &subset {
        indices.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }

    let keys: Vec<String> = input
        .rows
        .iter()
        .map(|row| row_key(row, &indices))
        .collect();

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut last_seen: HashMap<&str, usize> = HashMap::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        first_seen.entry(key.as_str()).or_insert(i);
        last_seen.insert(key.as_str(), i);
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }

    let rows: Vec<Vec<Cell>> = input
        .rows
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let key = keys[*i].as_str();
            match keep {
                Keep::First => first_seen[key] == *i,
                Keep::Last => last_seen[key] == *i,
                Keep::None => counts[key] == 1,
            }
        })
        .map(|(_, row)| row.clone())
        .collect();

    Table::new(input.columns.clone(), rows)
}

fn row_key(row: &[Cell], indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| row[i].as_key_text())
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            vec!["a".into()],
            vec![vec![Cell::Int(1)], vec![Cell::Int(1)], vec![Cell::Int(2)]],
        )
        .unwrap()
    }

    #[test]
    fn keep_first_drops_later_duplicates() {
        let out = deduplicate(&json!({"keep": "first"}), &sample()).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn keep_none_drops_every_duplicated_row() {
        let out = deduplicate(&json!({"keep": "none"}), &sample()).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0][0], Cell::Int(2));
    }

    #[test]
    fn legacy_false_string_means_none() {
        let out = deduplicate(&json!({"keep": "false"}), &sample()).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn idempotent() {
        let once = deduplicate(&json!({}), &sample()).unwrap();
        let twice = deduplicate(&json!({}), &once).unwrap();
        assert_eq!(once, twice);
    }
}
