use crate::config::str_or;
use serde_json::Value;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "concat";

/// `concat`: variadic. Vertical stack of all inputs; `join ∈ {outer,
/// inner}` decides union vs. intersection of column names. Output row
/// count is always the sum of the input row counts; row order preserves
/// input order across inputs.
pub fn concat(config: &Value, inputs: &[&Table]) -> TableResult<Table> {
    if inputs.is_empty() {
        return Err(TableError::config(format!(
            "{OP}: requires at least one input"
        )));
    }
    let join = str_or(config, &["join"], "outer");

    let out_columns: Vec<String> = match join.as_str() {
        "inner" => {
            let mut columns = inputs[0].columns.clone();
            for table in &inputs[1..] {
                columns.retain(|c| table.has_column(c));
            }
            columns
        }
        "outer" => {
            let mut columns = Vec::new();
            for table in inputs {
                for c in &table.columns {
                    if !columns.contains(c) {
                        columns.push(c.clone());
                    }
                }
            }
            columns
        }
        other => {
            return Err(TableError::config(format!(
                "{OP}: unknown join mode '{other}'"
            )));
        }
    };

    let mut out_rows = Vec::new();
    for table in inputs {
        for row in &table.rows {
            let mut out_row = Vec::with_capacity(out_columns.len());
            for name in &out_columns {
                out_row.push(match table.col_index(name) {
                    Some(idx) => row[idx].clone(),
                    None => Cell::Null,
                });
            }
            out_rows.push(out_row);
        }
    }

    Table::new(out_columns, out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outer_concat_fills_missing_columns_with_null() {
        let a = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Int(1), Cell::Int(2)]],
        )
        .unwrap();
        let b = Table::new(
            vec!["b".into(), "c".into()],
            vec![vec![Cell::Int(3), Cell::Int(4)]],
        )
        .unwrap();
        let config = json!({"join": "outer"});
        let out = concat(&config, &[&a, &b]).unwrap();
        assert_eq!(out.columns, vec!["a", "b", "c"]);
        assert_eq!(
            out.rows,
            vec![
                vec![Cell::Int(1), Cell::Int(2), Cell::Null],
                vec![Cell::Null, Cell::Int(3), Cell::Int(4)],
            ]
        );
    }

    #[test]
    fn row_count_is_sum_of_inputs() {
        let a = Table::new(vec!["a".into()], vec![vec![Cell::Int(1)], vec![Cell::Int(2)]]).unwrap();
        let b = Table::new(vec!["a".into()], vec![vec![Cell::Int(3)]]).unwrap();
        let out = concat(&json!({"join": "inner"}), &[&a, &b]).unwrap();
        assert_eq!(out.row_count(), a.row_count() + b.row_count());
    }
}
