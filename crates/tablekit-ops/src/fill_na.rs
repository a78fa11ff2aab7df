use crate::config::opt_str_list;
use serde_json::Value;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "fill_na";

/// `fill_na`: strategy ∈ {drop, fill_value, ffill, bfill, mean, median}
/// over `columns` (default: all); `mean`/`median` apply only to numeric
/// columns.
pub fn fill_na(config: &Value, input: &Table) -> TableResult<Table> {
    let strategy = config
        .get("strategy")
        .and_then(Value::as_str)
        .ok_or_else(|| TableError::config(format!("{OP}: missing required config key 'strategy'")))?;

    let columns = opt_str_list(config, &["columns"]).unwrap_or_else(|| input.columns.clone());
    let mut indices = Vec::with_capacity(columns.len());
    for name in &columns {
        indices.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }

    match strategy {
        "drop" => drop_rows_with_null(input, &indices),
        "fill_value" => {
            let value = config.get("value").map(json_to_cell).unwrap_or(Cell::Null);
            fill_constant(input, &indices, value)
        }
        "ffill" => fill_directional(input, &indices, true),
        "bfill" => fill_directional(input, &indices, false),
        "mean" => fill_statistic(input, &indices, Statistic::Mean),
        "median" => fill_statistic(input, &indices, Statistic::Median),
        other => Err(TableError::config(format!(
            "{OP}: unknown strategy '{other}'"
        ))),
    }
}

fn json_to_cell(v: &Value) -> Cell {
    match v {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(Cell::Int)
            .unwrap_or_else(|| Cell::Float(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn drop_rows_with_null(input: &Table, indices: &[usize]) -> TableResult<Table> {
    let rows: Vec<Vec<Cell>> = input
        .rows
        .iter()
        .filter(|row| !indices.iter().any(|&i| row[i].is_null()))
        .cloned()
        .collect();
    Table::new(input.columns.clone(), rows)
}

fn fill_constant(input: &Table, indices: &[usize], value: Cell) -> TableResult<Table> {
    let mut table = input.clone();
    for row in table.rows.iter_mut() {
        for &idx in indices {
            if row[idx].is_null() {
                row[idx] = value.clone();
            }
        }
    }
    Ok(table)
}

fn fill_directional(input: &Table, indices: &[usize], forward: bool) -> TableResult<Table> {
    let mut table = input.clone();
    for &idx in indices {
        let mut carry: Option<Cell> = None;
        let order: Vec<usize> = if forward {
            (0..table.rows.len()).collect()
        } else {
            (0..table.rows.len()).rev().collect()
        };
        for r in order {
            if table.rows[r][idx].is_null() {
                if let Some(c) = &carry {
                    table.rows[r][idx] = c.clone();
                }
            } else {
                carry = Some(table.rows[r][idx].clone());
            }
        }
    }
    Ok(table)
}

enum Statistic {
    Mean,
    Median,
}

fn fill_statistic(input: &Table, indices: &[usize], stat: Statistic) -> TableResult<Table> {
    let mut table = input.clone();
    for &idx in indices {
        if !table.column_is_numeric(&table.columns[idx]) {
            continue;
        }
        let mut values: Vec<f64> = table
            .rows
            .iter()
            .filter_map(|row| row[idx].as_f64())
            .collect();
        if values.is_empty() {
            continue;
        }
        let replacement = match stat {
            Statistic::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Statistic::Median => {
                values.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        };
        for row in table.rows.iter_mut() {
            if row[idx].is_null() {
                row[idx] = Cell::Float(replacement);
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drop_removes_rows_with_null_in_target_columns() {
        let table = Table::new(
            vec!["a".into()],
            vec![vec![Cell::Int(1)], vec![Cell::Null]],
        )
        .unwrap();
        let config = json!({"strategy": "drop", "columns": ["a"]});
        let out = fill_na(&config, &table).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn mean_fills_only_numeric_columns() {
        let table = Table::new(
            vec!["a".into()],
            vec![
                vec![Cell::Float(10.0)],
                vec![Cell::Float(20.0)],
                vec![Cell::Null],
            ],
        )
        .unwrap();
        let config = json!({"strategy": "mean"});
        let out = fill_na(&config, &table).unwrap();
        assert_eq!(out.rows[2][0], Cell::Float(15.0));
    }
}
