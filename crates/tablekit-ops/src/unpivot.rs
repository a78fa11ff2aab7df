use crate::config::{opt_str_list, str_or};
use serde_json::Value;
use tablekit_common::{Cell, Table, TableResult};

const OP: &str = "unpivot";

/// `unpivot`: melts `value_vars` into two columns `{var_name, value_name}`,
/// preserving `id_vars`.
pub fn unpivot(config: &Value, input: &Table) -> TableResult<Table> {
    let id_vars = opt_str_list(config, &["id_vars"]).unwrap_or_default();
    let value_vars =
        opt_str_list(config, &["value_vars"]).unwrap_or_else(|| {
            input
                .columns
                .iter()
                .filter(|c| !id_vars.contains(c))
                .cloned()
                .collect()
        });
    let var_name = str_or(config, &["var_name"], "variable");
    let value_name = str_or(config, &["value_name"], "value");

    let mut id_idx = Vec::with_capacity(id_vars.len());
    for name in &id_vars {
        id_idx.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }
    let mut value_idx = Vec::with_capacity(value_vars.len());
    for name in &value_vars {
        value_idx.push(
            input
                .col_index(name)
                .ok_or_else(|| input.missing_column_error(OP, name))?,
        );
    }

    let mut columns = id_vars.clone();
    columns.push(var_name);
    columns.push(value_name);

    let mut rows = Vec::with_capacity(input.rows.len() * value_vars.len());
    for row in &input.rows {
        let id_cells: Vec<Cell> = id_idx.iter().map(|&i| row[i].clone()).collect();
        for (name, &idx) in value_vars.iter().zip(&value_idx) {
            let mut melted = id_cells.clone();
            melted.push(Cell::Text(name.clone()));
            melted.push(row[idx].clone());
            rows.push(melted);
        }
    }

    Table::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn melts_value_vars_preserving_id_vars() {
        let table = Table::new(
            vec!["id".into(), "jan".into(), "feb".into()],
            vec![vec![Cell::Int(1), Cell::Int(10), Cell::Int(20)]],
        )
        .unwrap();
        let config = json!({"id_vars": ["id"], "value_vars": ["jan", "feb"]});
        let out = unpivot(&config, &table).unwrap();
        assert_eq!(out.columns, vec!["id", "variable", "value"]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows[0], vec![Cell::Int(1), Cell::Text("jan".into()), Cell::Int(10)]);
    }
}
