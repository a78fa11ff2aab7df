use crate::config::{require_str, require_str_list};
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "pivot";

/// `pivot`: `{index[], columns, values, aggfunc}` produces an
/// index×columns matrix; missing cells are `0`.
pub fn pivot(config: &Value, input: &Table) -> TableResult<Table> {
    let index = require_str_list(config, OP, &["index"])?;
    let columns_key = require_str(config, OP, &["columns"])?;
    let values_key = require_str(config, OP, &["values"])?;
    let aggfunc = config
        .get("aggfunc")
        .and_then(Value::as_str)
        .unwrap_or("sum")
        .to_string();

    let mut index_idx = Vec::with_capacity(index.len());
    for name in &index {
        index_idx.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }
    let columns_idx = input
        .col_index(&columns_key)
        .ok_or_else(|| input.missing_column_error(OP, &columns_key))?;
    let values_idx = input
        .col_index(&values_key)
        .ok_or_else(|| input.missing_column_error(OP, &values_key))?;

    let mut column_order: Vec<String> = Vec::new();
    let mut row_order: Vec<String> = Vec::new();
    let mut row_keys: HashMap<String, Vec<Cell>> = HashMap::new();
    let mut cells: HashMap<(String, String), Vec<f64>> = HashMap::new();
    let mut counts: HashMap<(String, String), usize> = HashMap::new();

    for row in &input.rows {
        let row_key = index_idx
            .iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !row_keys.contains_key(&row_key) {
            row_order.push(row_key.clone());
            row_keys.insert(
                row_key.clone(),
                index_idx.iter().map(|&i| row[i].clone()).collect(),
            );
        }
        let col_key = row[columns_idx].as_key_text();
        if !column_order.contains(&col_key) {
            column_order.push(col_key.clone());
        }
        let entry = cells.entry((row_key.clone(), col_key.clone())).or_default();
        if let Some(v) = row[values_idx].as_f64() {
            entry.push(v);
        }
        *counts.entry((row_key, col_key)).or_insert(0) += 1;
    }

    let mut out_columns = index.clone();
    out_columns.extend(column_order.iter().cloned());

    let mut out_rows = Vec::with_capacity(row_order.len());
    for row_key in &row_order {
        let mut row = row_keys[row_key].clone();
        for col_key in &column_order {
            let cell_key = (row_key.clone(), col_key.clone());
            let value = match aggfunc.as_str() {
                "count" => Cell::Int(*counts.get(&cell_key).unwrap_or(&0) as i64),
                _ => {
                    let values = cells.get(&cell_key).cloned().unwrap_or_default();
                    aggregate(&values, &aggfunc)?
                }
            };
            row.push(value);
        }
        out_rows.push(row);
    }

    Table::new(out_columns, out_rows)
}

fn aggregate(values: &[f64], func: &str) -> TableResult<Cell> {
    if values.is_empty() {
        return Ok(Cell::Int(0));
    }
    let result = match func {
        "sum" => values.iter().sum(),
        "mean" => values.iter().sum::<f64>() / values.len() as f64,
        "min" => values.iter().cloned().fold(f64::INFINITY, f64::min),
        "max" => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        other => return Err(TableError::config(format!("{OP}: unknown aggfunc '{other}'"))),
    };
    Ok(Cell::Float(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pivots_with_zero_for_missing_cells() {
        let table = Table::new(
            vec!["region".into(), "month".into(), "amt".into()],
            vec![
                vec![Cell::Text("east".into()), Cell::Text("jan".into()), Cell::Int(10)],
                vec![Cell::Text("west".into()), Cell::Text("feb".into()), Cell::Int(5)],
            ],
        )
        .unwrap();
        let config = json!({"index": ["region"], "columns": "month", "values": "amt", "aggfunc": "sum"});
        let out = pivot(&config, &table).unwrap();
        assert_eq!(out.columns, vec!["region", "jan", "feb"]);
        let east = out
            .rows
            .iter()
            .find(|r| r[0] == Cell::Text("east".into()))
            .unwrap();
        assert_eq!(east[2], Cell::Int(0));
    }
}
