use crate::config::{opt_str_list, require_str};
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableResult};

const OP: &str = "vlookup";

/// `vlookup`: binary; first input is the **main** table (shape preserved),
/// second is the lookup. `{left_key, right_key (defaults to left_key),
/// columns_to_get[]}` (`lookup_key` aliases both key fields,
/// `return_columns` aliases `columns_to_get`). Coerces both keys to text.
/// Invalid `columns_to_get`
/// names are dropped; an empty list defaults to every lookup column
/// except the key and except any column already present on the main
/// side. Left join; drops the right key when renamed onto the left name.
pub fn vlookup(config: &Value, main: &Table, lookup: &Table) -> TableResult<Table> {
    let left_key = require_str(config, OP, &["left_key", "lookup_key"])?;
    let right_key = require_str(config, OP, &["right_key", "lookup_key"]).unwrap_or_else(|_| left_key.clone());

    let left_idx = main
        .col_index(&left_key)
        .ok_or_else(|| main.missing_column_error(OP, &left_key))?;
    let right_idx = lookup
        .col_index(&right_key)
        .ok_or_else(|| lookup.missing_column_error(OP, &right_key))?;

    let requested = opt_str_list(config, &["columns_to_get", "return_columns"]).unwrap_or_default();
    let columns_to_get: Vec<String> = if requested.is_empty() {
        lookup
            .columns
            .iter()
            .filter(|c| *c != &right_key && !main.has_column(c))
            .cloned()
            .collect()
    } else {
        requested
            .into_iter()
            .filter(|c| lookup.has_column(c))
            .collect()
    };

    let get_idx: Vec<usize> = columns_to_get
        .iter()
        .map(|c| lookup.col_index(c).unwrap())
        .collect();

    let mut out_columns = main.columns.clone();
    let mut out_names = Vec::with_capacity(columns_to_get.len());
    for name in &columns_to_get {
        let final_name = Table::unique_suffixed_name(&out_columns, name);
        out_names.push(final_name.clone());
        out_columns.push(final_name);
    }

    let mut by_key: HashMap<String, usize> = HashMap::new();
    for (r, row) in lookup.rows.iter().enumerate() {
        by_key
            .entry(row[right_idx].as_key_text())
            .or_insert(r);
    }

    let mut out_rows = Vec::with_capacity(main.rows.len());
    for row in &main.rows {
        let key = row[left_idx].as_key_text();
        let mut out_row = row.clone();
        match by_key.get(&key) {
            Some(&r) => {
                for &idx in &get_idx {
                    out_row.push(lookup.rows[r][idx].clone());
                }
            }
            None => {
                for _ in &get_idx {
                    out_row.push(Cell::Null);
                }
            }
        }
        out_rows.push(out_row);
    }

    let _ = out_names;
    Table::new(out_columns, out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_matching_names_and_nulls_unmatched() {
        let main = Table::new(
            vec!["sku".into()],
            vec![vec![Cell::Int(1)], vec![Cell::Int(2)], vec![Cell::Int(3)]],
        )
        .unwrap();
        let lookup = Table::new(
            vec!["sku".into(), "name".into()],
            vec![
                vec![Cell::Int(1), Cell::Text("x".into())],
                vec![Cell::Int(2), Cell::Text("y".into())],
            ],
        )
        .unwrap();
        let config = json!({"left_key": "sku", "right_key": "sku", "columns_to_get": ["name"]});
        let out = vlookup(&config, &main, &lookup).unwrap();
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.rows[0][1], Cell::Text("x".into()));
        assert_eq!(out.rows[1][1], Cell::Text("y".into()));
        assert_eq!(out.rows[2][1], Cell::Null);
    }

    #[test]
    fn default_columns_exclude_key_and_existing_main_columns() {
        let main = Table::new(
            vec!["sku".into(), "name".into()],
            vec![vec![Cell::Int(1), Cell::Text("existing".into())]],
        )
        .unwrap();
        let lookup = Table::new(
            vec!["sku".into(), "name".into(), "price".into()],
            vec![vec![Cell::Int(1), Cell::Text("other".into()), Cell::Float(9.99)]],
        )
        .unwrap();
        let config = json!({"left_key": "sku"});
        let out = vlookup(&config, &main, &lookup).unwrap();
        assert_eq!(out.columns, vec!["sku", "name", "price"]);
    }
}
