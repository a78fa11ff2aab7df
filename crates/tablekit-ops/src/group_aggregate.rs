use crate::config::{opt_array, require_str_list};
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "group_aggregate";

struct AggSpec {
    column: String,
    func: String,
    alias: String,
}

/// `group_aggregate`: groups by `group_by`; each `aggregations[i]`
/// `{column, func, alias}` produces one output column (default alias
/// `<column>_<func>`). Result columns = group keys then aggregates in
/// declaration order. Empty `aggregations` defaults to a numeric sum over
/// every non-key column.
pub fn group_aggregate(config: &Value, input: &Table) -> TableResult<Table> {
    let group_by = require_str_list(config, OP, &["group_by"])?;
    let mut key_indices = Vec::with_capacity(group_by.len());
    for name in &group_by {
        key_indices.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }

    let mut specs = parse_aggregations(config)?;
    if specs.is_empty() {
        specs = default_sum_specs(input, &group_by);
    }
    for spec in &specs {
        if input.col_index(&spec.column).is_none() {
            return Err(input.missing_column_error(OP, &spec.column));
        }
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Vec<Cell>>> = HashMap::new();
    for row in &input.rows {
        let key = key_indices
            .iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut out_columns = group_by.clone();
    for spec in &specs {
        out_columns.push(spec.alias.clone());
    }

    let mut out_rows = Vec::with_capacity(order.len());
    for key in &order {
        let members = &groups[key];
        let first_row = members[0];
        let mut row: Vec<Cell> = key_indices.iter().map(|&i| first_row[i].clone()).collect();
        for spec in &specs {
            let col_idx = input.col_index(&spec.column).unwrap();
            row.push(aggregate(members, col_idx, &spec.func)?);
        }
        out_rows.push(row);
    }

    Table::new(out_columns, out_rows)
}

fn parse_aggregations(config: &Value) -> TableResult<Vec<AggSpec>> {
    let mut specs = Vec::new();
    for item in opt_array(config, "aggregations") {
        let column = item
            .get("column")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: aggregation missing 'column'")))?
            .to_string();
        let func = item
            .get("func")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: aggregation missing 'func'")))?
            .to_string();
        let alias = item
            .get("alias")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{column}_{func}"));
        specs.push(AggSpec { column, func, alias });
    }
    Ok(specs)
}

fn default_sum_specs(input: &Table, group_by: &[String]) -> Vec<AggSpec> {
    input
        .columns
        .iter()
        .filter(|c| !group_by.contains(c) && input.column_is_numeric(c))
        .map(|c| AggSpec {
            column: c.clone(),
            func: "sum".to_string(),
            alias: format!("{c}_sum"),
        })
        .collect()
}

fn aggregate(members: &[&Vec<Cell>], col_idx: usize, func: &str) -> TableResult<Cell> {
    match func {
        "count" => Ok(Cell::Int(members.len() as i64)),
        "first" => Ok(members[0][col_idx].clone()),
        "last" => Ok(members[members.len() - 1][col_idx].clone()),
        "sum" | "mean" | "min" | "max" => {
            let values: Vec<f64> = members
                .iter()
                .filter_map(|row| row[col_idx].as_f64())
                .collect();
            if values.is_empty() {
                return Ok(Cell::Null);
            }
            let result = match func {
                "sum" => values.iter().sum(),
                "mean" => values.iter().sum::<f64>() / values.len() as f64,
                "min" => values.iter().cloned().fold(f64::INFINITY, f64::min),
                "max" => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                _ => unreachable!(),
            };
            Ok(Cell::Float(result))
        }
        other => Err(TableError::config(format!("{OP}: unknown func '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sums_per_group_in_declaration_order() {
        let table = Table::new(
            vec!["city".into(), "amt".into()],
            vec![
                vec![Cell::Text("A".into()), Cell::Int(10)],
                vec![Cell::Text("A".into()), Cell::Int(20)],
                vec![Cell::Text("B".into()), Cell::Int(5)],
            ],
        )
        .unwrap();
        let config = json!({
            "group_by": ["city"],
            "aggregations": [{"column": "amt", "func": "sum", "alias": "total"}]
        });
        let out = group_aggregate(&config, &table).unwrap();
        assert_eq!(out.columns, vec!["city", "total"]);
        assert_eq!(out.rows[0], vec![Cell::Text("A".into()), Cell::Float(30.0)]);
        assert_eq!(out.rows[1], vec![Cell::Text("B".into()), Cell::Float(5.0)]);
    }

    #[test]
    fn output_rows_never_exceed_input_rows() {
        let table = Table::new(
            vec!["city".into(), "amt".into()],
            vec![
                vec![Cell::Text("A".into()), Cell::Int(1)],
                vec![Cell::Text("B".into()), Cell::Int(2)],
            ],
        )
        .unwrap();
        let config = json!({"group_by": ["city"]});
        let out = group_aggregate(&config, &table).unwrap();
        assert!(out.row_count() <= table.row_count());
    }
}
